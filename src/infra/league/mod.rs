// League storage backends.

#[cfg(test)]
mod in_memory;
mod sqlite_store;

#[cfg(test)]
pub use in_memory::InMemoryLeagueStore;
pub use sqlite_store::SqliteLeagueStore;
