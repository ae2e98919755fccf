mod post;
mod slug;

pub use self::{
    post::{Format, MAX_TEXT_LEN, Post, Status, search_config_for},
    slug::generate_slug,
};
