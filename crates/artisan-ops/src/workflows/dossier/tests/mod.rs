mod common;
mod next_action;
