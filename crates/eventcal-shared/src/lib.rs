pub mod event;
pub mod feed;
pub mod grid;
pub mod settings;
pub mod zone;

pub use event::{
  Event,
  Frequency
};
pub use feed::{
  EventRecord,
  load_error_message,
  parse_events
};
pub use grid::{
  CellEvent,
  DayCell,
  MonthGrid,
  WeekStart
};
pub use settings::CalendarSettings;
pub use zone::DisplayZone;
