pub mod auth;
mod comments;
mod content;
