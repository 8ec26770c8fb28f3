//! Табличная часть «Автомобили» документа продажи
//!
//! - row.rs: состояние строки и группы строк
//! - sync.rs: синхронизация цены и суммы строки с сервером
//! - view.rs: компонент таблицы

mod row;
mod sync;
mod view;

pub use row::{LineRow, LineRows};
pub use sync::synchronize;
pub use view::LinesTable;
