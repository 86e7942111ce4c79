mod executor;
mod fragments;
mod lists;
mod mutations;
mod subscriptions;
mod variables;
