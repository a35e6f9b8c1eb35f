//! tournav lib test modules

mod destination;
mod store;
