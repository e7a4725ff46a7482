//! Marker-based syntax tree builder.
//!
//! A parser drives a [`Builder`] over a [`TokenStream`]: it opens [`Marker`]s
//! where nodes may start and later completes, collapses, drops or rolls them
//! back. Whitespace and comments never reach the parser; once parsing is over
//! they are attached to nodes by [`EdgeBinder`]s and the log of markers is
//! materialized either as a [`weft_tree::SyntaxTree`] or as a flyweight
//! [`LighterTree`].

mod binder;
mod builder;
mod classifier;
mod cursor;
mod lexer;
mod lighter;
mod log;
mod marker;
mod materialize;
mod violation;

#[cfg(test)]
mod tests;

pub use binder::{
    Binder, BinderTable, DEFAULT_LEFT, DEFAULT_RIGHT, DefaultLeftBinder, DefaultRightBinder,
    EdgeBinder, EdgeBinders, EdgeTokens, GREEDY_LEFT, GREEDY_RIGHT, GreedyLeftBinder,
    GreedyRightBinder, LeadingCommentsBinder, TrailingCommentsBinder,
};
pub use builder::Builder;
pub use classifier::Classifier;
pub use lexer::{Lexer, Token, TokenStream, TokenStreamError};
pub use lighter::{LighterNode, LighterTree};
pub use marker::{CompletedMarker, Marker, MarkerId};
pub use materialize::Parse;
pub use violation::{ProtocolViolation, Site};
