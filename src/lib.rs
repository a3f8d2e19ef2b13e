#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::struct_excessive_bools,
    clippy::too_many_lines,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::doc_markdown
)]

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod events;
pub mod filter;
pub mod input;
pub mod links;
pub mod model;
pub mod pagination;
pub mod parser;
pub mod projector;
pub mod source;
pub mod store;
pub mod timefmt;
pub mod tui;
pub mod view_state;
