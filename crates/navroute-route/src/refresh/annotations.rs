//! Annotation splicing

use navroute_types::{JsonProperties, LegAnnotation};
use serde_json::Value;

/// Splice `new` into `old` starting at segment `start`.
///
/// The result keeps the length of `old`: entries before `start` are kept,
/// entries from `start` on are taken from `new` while it has data. A missing
/// old array stays missing, and so does one that `start` lies beyond.
pub(crate) fn splice<T: Clone>(old: Option<&Vec<T>>, new: Option<&Vec<T>>, start: usize) -> Option<Vec<T>> {
    let old = old?;
    if start > old.len() {
        return None;
    }
    let Some(new) = new else {
        return Some(old.clone());
    };

    Some(
        old.iter()
            .enumerate()
            .map(|(i, old_value)| {
                if i < start {
                    old_value.clone()
                } else {
                    new.get(i - start).unwrap_or(old_value).clone()
                }
            })
            .collect(),
    )
}

/// Restore `old` values inside `[window_start, window_end)`
fn keep_window<T: Clone>(
    mut merged: Option<Vec<T>>,
    old: Option<&Vec<T>>,
    window: Option<(usize, usize)>,
) -> Option<Vec<T>> {
    if let (Some(values), Some(old), Some((window_start, window_end))) = (merged.as_mut(), old, window) {
        values
            .iter_mut()
            .zip(old.iter())
            .take(window_end)
            .skip(window_start)
            .for_each(|(value, old_value)| *value = old_value.clone());
    }
    merged
}

fn splice_unrecognized(old: &JsonProperties, new: Option<&JsonProperties>, start: usize) -> JsonProperties {
    let mut merged = JsonProperties::new();
    for (key, old_value) in old {
        let value = match (old_value, new.and_then(|n| n.get(key))) {
            (Value::Array(old_array), Some(Value::Array(new_array))) => {
                match splice(Some(old_array), Some(new_array), start) {
                    Some(array) => Value::Array(array),
                    None => continue,
                }
            }
            _ => old_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

/// Merge a refreshed annotation into the leg's current one.
///
/// Congestion inside `override_window` keeps its current values.
pub(crate) fn merge_annotation(
    old: Option<&LegAnnotation>,
    new: Option<&LegAnnotation>,
    start: usize,
    override_window: Option<(usize, usize)>,
) -> Option<LegAnnotation> {
    let old = old?;

    let congestion = splice(old.congestion.as_ref(), new.and_then(|n| n.congestion.as_ref()), start);
    let congestion_numeric = splice(
        old.congestion_numeric.as_ref(),
        new.and_then(|n| n.congestion_numeric.as_ref()),
        start,
    );

    Some(LegAnnotation {
        distance: splice(old.distance.as_ref(), new.and_then(|n| n.distance.as_ref()), start),
        duration: splice(old.duration.as_ref(), new.and_then(|n| n.duration.as_ref()), start),
        speed: splice(old.speed.as_ref(), new.and_then(|n| n.speed.as_ref()), start),
        maxspeed: splice(old.maxspeed.as_ref(), new.and_then(|n| n.maxspeed.as_ref()), start),
        congestion: keep_window(congestion, old.congestion.as_ref(), override_window),
        congestion_numeric: keep_window(congestion_numeric, old.congestion_numeric.as_ref(), override_window),
        freeflow_speed: splice(
            old.freeflow_speed.as_ref(),
            new.and_then(|n| n.freeflow_speed.as_ref()),
            start,
        ),
        current_speed: splice(
            old.current_speed.as_ref(),
            new.and_then(|n| n.current_speed.as_ref()),
            start,
        ),
        unrecognized: splice_unrecognized(&old.unrecognized, new.map(|n| &n.unrecognized), start),
    })
}
