//! Types that represent the core data model, such as `Reading` and `ReadingTable`.
mod reading;
mod table;
mod value;
mod window;

pub use reading::{Reading, ReadingError};
pub use table::{ReadingRow, ReadingTable, DATE};
pub use value::MeterValue;
pub use window::Window;
