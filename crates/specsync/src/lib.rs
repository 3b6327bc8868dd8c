#![doc = include_str!("../README.md")]

mod detach;
mod graph;
mod query;
mod reconcile;
mod types;

pub mod v1 {
    //! Versioned public API for specsync collection trees.
    //!
    //! # Collections and items
    //!
    //! - [`Collection`] — the persisted aggregate for one spec title
    //! - [`StoredCollection`] — a collection plus its store id
    //! - [`CollectionItem`] — a `FOLDER` or `REQUEST` node ([`ItemKind`])
    //! - [`RequestDetails`], [`Parameter`], [`RequestBody`] — request payload
    //! - [`ItemKey`] — sibling identity used by reconciliation
    //! - [`ItemSource`], [`Audit`], [`Actor`] — provenance
    //!
    //! # Document graph
    //!
    //! - [`DocumentGraph`] — arena holding a parsed, dereferenced spec
    //! - [`Fragment`] — schema attached to a request, linked or detached
    //!
    //! # Algorithms
    //!
    //! - [`merge`] / [`merge_with_stats`] — reconcile two sibling lists
    //! - [`detach`] — cycle-safe copy of an item under a [`CopyPolicy`]
    //!
    //! # Example — reconcile a re-import
    //!
    //! ```
    //! use chrono::Utc;
    //! use specsync::v1::*;
    //!
    //! let stamp = Audit::new(&Actor::new("alex"), Utc::now());
    //! let get_user = |desc: &str| {
    //!     CollectionItem::request(
    //!         "r1",
    //!         "GetUser",
    //!         ItemSource::Spec,
    //!         stamp.clone(),
    //!         RequestDetails::new(HttpMethod::Get, "/users/{id}"),
    //!     )
    //!     .with_description(desc)
    //! };
    //! let mine = CollectionItem::request(
    //!     "r2",
    //!     "DeleteUser",
    //!     ItemSource::User,
    //!     stamp.clone(),
    //!     RequestDetails::new(HttpMethod::Delete, "/users/{id}"),
    //! );
    //!
    //! let stored = vec![
    //!     CollectionItem::folder("f1", "Users", ItemSource::Spec, stamp.clone())
    //!         .with_item(get_user("old"))
    //!         .with_item(mine),
    //! ];
    //! let pulled = vec![
    //!     CollectionItem::folder("f1", "Users", ItemSource::Spec, stamp.clone())
    //!         .with_item(get_user("new")),
    //! ];
    //!
    //! let merged = merge(stored, pulled);
    //! let users = merged[0].children();
    //! assert_eq!(users[0].description.as_deref(), Some("new"));
    //! assert_eq!(users[1].name, "DeleteUser");
    //! assert!(!users[1].is_deleted);
    //! ```

    /// Read-only queries over item trees.
    ///
    /// ```
    /// use chrono::Utc;
    /// use specsync::v1::{query, Actor, Audit, CollectionItem, HttpMethod, ItemSource, RequestDetails};
    ///
    /// let stamp = Audit::new(&Actor::new("alex"), Utc::now());
    /// let folder = CollectionItem::folder("f1", "Pets", ItemSource::Spec, stamp.clone())
    ///     .with_item(CollectionItem::request(
    ///         "r1",
    ///         "ListPets",
    ///         ItemSource::Spec,
    ///         stamp,
    ///         RequestDetails::new(HttpMethod::Get, "/pets"),
    ///     ));
    /// assert_eq!(query::count_requests(&[folder]), 1);
    /// ```
    pub mod query {
        pub use crate::query::{count_requests, find_by_key, live, retired, walk};
    }
    pub use crate::detach::{CopyPolicy, detach, detach_fragment};
    pub use crate::graph::{DocumentGraph, Node, NodeId};
    pub use crate::reconcile::{MergeStats, merge, merge_with_stats};
    pub use crate::types::{
        Actor, Audit, Collection, CollectionId, CollectionItem, Fragment, GraphRef, HttpMethod,
        ItemKey, ItemKind, ItemSource, Parameter, RequestBody, RequestDetails, StoredCollection,
    };
}
