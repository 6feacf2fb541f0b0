// Task reminders: CRUD over the store plus the background delivery loop.

pub mod dispatcher;
pub mod handlers;
