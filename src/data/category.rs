use super::model::{Category, Dataset};

/// Map a PM2.5 concentration to its air-quality category.
///
/// Each boundary belongs to the lower category (50 is `Good`, 100 is
/// `Moderate`, 150 is `UnhealthyForSensitiveGroups`). A missing or NaN
/// reading has no category.
pub fn categorize(pm25: Option<f64>) -> Option<Category> {
    let pm = pm25.filter(|v| !v.is_nan())?;
    Some(if pm <= 50.0 {
        Category::Good
    } else if pm <= 100.0 {
        Category::Moderate
    } else if pm <= 150.0 {
        Category::UnhealthyForSensitiveGroups
    } else {
        Category::Unhealthy
    })
}

/// Fill in the category of every reading from its PM2.5 value.
///
/// A dataset that already carries a category column is left untouched.
/// Returns `true` when labels were computed.
pub fn classify(dataset: &mut Dataset) -> bool {
    if dataset.has_category_column() {
        return false;
    }
    for r in dataset.readings_mut() {
        r.category = categorize(r.pm25);
    }
    dataset.mark_categorized();
    true
}
