//! Application services that drive the quiz.

pub mod bot;
pub mod checkers;
pub mod chitchat;
pub mod composer;
pub mod keeper;
pub mod lifecycle;
pub mod locks;
pub mod notifier;
pub mod registrar;
