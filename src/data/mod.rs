/// Data layer: readings, loading, classification, filtering and aggregation.
///
/// Architecture:
/// ```text
///   main_data.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  locate + parse once → Dataset (memoized in DatasetSource)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ category  │  PM2.5 → Air_Quality_Category (unless already present)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection (stations, date interval) → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  daily trend, station means, category counts → Summary
///   └───────────┘
/// ```

pub mod aggregate;
pub mod category;
pub mod filter;
pub mod loader;
pub mod model;
