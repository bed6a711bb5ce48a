//! Business logic services.
//!
//! Services are the filtered access path: every read or write arrives with
//! the calling profile, and visibility rules are applied here, exactly
//! once. Services consult the repositories (which never filter by caller)
//! for the underlying rows, so a predicate that needs to query the very
//! relation it guards, membership checks above all, stays non-recursive.

#![allow(missing_docs)]

pub mod conversation;
pub mod event_publisher;
pub mod follow;
pub mod group;
pub mod group_access;
pub mod post;
pub mod profile;
pub mod read_status;

pub use conversation::{ConversationService, ConversationSummary};
pub use event_publisher::{EventPublisher, EventPublisherService, NoOpEventPublisher, StreamEvent};
pub use follow::{FollowService, RelationState};
pub use group::{CreateGroupInput, GroupService};
pub use group_access::GroupAccess;
pub use post::{CreateCommentInput, CreatePostInput, PostService};
pub use profile::{ProfileHints, ProfileService, UpdateProfileInput};
pub use read_status::ReadStatusService;
