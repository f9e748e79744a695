//! Business logic services.

pub mod account;
pub mod dual_write;
pub mod interaction;
pub mod social_graph;
pub mod token;

pub use account::{AccountService, AuthOutcome, AuthenticateInput};
pub use dual_write::DualWrite;
pub use interaction::{
    CommentInput, CreatePostInput, Engagement, InteractionService, PostSummary,
};
pub use social_graph::{Profile, SocialGraphService, UserSummary};
pub use token::{JwtTokenService, SharedTokenService, TokenService};
