//! Database entities.

pub mod comment;
pub mod conversation;
pub mod follow_edge;
pub mod follow_request;
pub mod group;
pub mod group_member;
pub mod group_message;
pub mod like;
pub mod message;
pub mod post;
pub mod profile;
pub mod read_status;

pub use comment::Entity as Comment;
pub use conversation::Entity as Conversation;
pub use follow_edge::Entity as FollowEdge;
pub use follow_request::Entity as FollowRequest;
pub use group::Entity as Group;
pub use group_member::Entity as GroupMember;
pub use group_message::Entity as GroupMessage;
pub use like::Entity as Like;
pub use message::Entity as Message;
pub use post::Entity as Post;
pub use profile::Entity as Profile;
pub use read_status::Entity as ReadStatus;
