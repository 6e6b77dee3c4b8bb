mod expenses;
mod memory;
mod trips;

pub use expenses::{DynExpenseRepo, ExpenseRepo};
pub use memory::MemoryStore;
pub use trips::{DynTripRepo, TripLookupError, TripRepo};
