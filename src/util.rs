use itertools::Itertools;

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }

    let sorted = sorted_ascending(data);
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Mean of `data` after dropping `trim` values from each end of the sorted order.
/// `None` when nothing remains.
pub fn trimmed_mean(data: &[f64], trim: usize) -> Option<f64> {
    if data.len() <= trim * 2 {
        return None;
    }

    let sorted = sorted_ascending(data);
    mean(&sorted[trim..sorted.len() - trim])
}

pub fn sorted_ascending(data: &[f64]) -> Vec<f64> {
    data.iter().copied().sorted_by(|a, b| a.total_cmp(b)).collect()
}
