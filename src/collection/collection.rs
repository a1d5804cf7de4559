use crate::model::{Author, Entity, Post};
use std::collections::HashMap;
use std::ops::Deref;

/// A normalized collection: an ordered list of ids plus an id-to-entity map.
///
/// `ids` and the keys of the map always hold the same set of identifiers, and
/// `ids` never contains a duplicate. Iteration follows `ids`, which is
/// insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityCollection<T> {
    ids: Vec<String>,
    all: HashMap<String, T>,
    loaded: bool,
}

impl<T> Default for EntityCollection<T> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            all: HashMap::new(),
            loaded: false,
        }
    }
}

impl<T: Entity> EntityCollection<T> {
    /// Create an empty collection that has not been loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a sequence of entities.
    ///
    /// Later entities with an id already seen replace the earlier one in place.
    pub fn from_entities<I>(entities: I, loaded: bool) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut collection = Self::new();
        collection.merge(entities);
        collection.loaded = loaded;
        collection
    }

    /// Insert an entity, appending its id if it is new.
    ///
    /// Returns `true` if the id was not present before. An existing entity
    /// with the same id is replaced and keeps its position.
    pub fn insert(&mut self, entity: T) -> bool {
        let id = entity.id().to_owned();
        let is_new = self.all.insert(id.clone(), entity).is_none();
        if is_new {
            self.ids.push(id);
        }
        debug_assert_eq!(self.ids.len(), self.all.len());
        is_new
    }

    /// Upsert every entity in order.
    pub fn merge<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = T>,
    {
        for entity in entities {
            self.insert(entity);
        }
    }

    /// Flag the collection as fully fetched from the remote source.
    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }
}

impl<T> EntityCollection<T> {
    /// Panic unless `ids` and the map keys are the same set, without duplicates.
    #[cfg(test)]
    pub(crate) fn assert_normalized(&self) {
        use std::collections::HashSet;

        let ids: HashSet<&str> = self.ids.iter().map(String::as_str).collect();
        let keys: HashSet<&str> = self.all.keys().map(String::as_str).collect();
        assert_eq!(ids.len(), self.ids.len(), "duplicate ids in {:?}", self.ids);
        assert_eq!(ids, keys, "id list and map keys differ");
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.all.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.all.contains_key(id)
    }

    /// Identifiers in display order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Whether a full fetch has completed at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entities in display order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.ids.iter().filter_map(move |id| self.all.get(id))
    }
}

pub type PostCollection = EntityCollection<Post>;

/// Authors plus the identity of the active session user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthorCollection {
    collection: EntityCollection<Author>,
    current_user_id: Option<String>,
}

impl AuthorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the most recently created author in this session.
    pub fn current_user_id(&self) -> Option<&str> {
        self.current_user_id.as_deref()
    }

    pub fn current_user(&self) -> Option<&Author> {
        self.current_user_id
            .as_deref()
            .and_then(|id| self.collection.get(id))
    }

    /// Insert an author and make it the current user in the same step.
    pub fn insert_current(&mut self, author: Author) {
        let id = author.id.clone();
        self.collection.insert(author);
        self.current_user_id = Some(id);
    }

    /// Insert an author without touching the current user.
    pub fn insert(&mut self, author: Author) -> bool {
        self.collection.insert(author)
    }
}

impl Deref for AuthorCollection {
    type Target = EntityCollection<Author>;

    fn deref(&self) -> &Self::Target {
        &self.collection
    }
}

/// Everything the store holds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    pub(crate) posts: PostCollection,
    pub(crate) authors: AuthorCollection,
}

impl State {
    pub fn new(posts: PostCollection, authors: AuthorCollection) -> Self {
        Self { posts, authors }
    }

    /// The startup state: the mock posts, not loaded, and no authors.
    pub fn seeded() -> Self {
        Self {
            posts: PostCollection::from_entities(crate::mocks::seed_posts(), false),
            authors: AuthorCollection::new(),
        }
    }

    pub fn posts(&self) -> &PostCollection {
        &self.posts
    }

    pub fn authors(&self) -> &AuthorCollection {
        &self.authors
    }
}
