//! Merging of ranged road objects
//!
//! Incidents and closures from the refresh replace the current ones inside
//! the refreshed range `[start, last]`. Notifications follow the same rule,
//! except that static notifications are never recomputed by the backend and
//! are always kept.

use navroute_types::{GeometryRange, Notification};
use tracing::warn;

fn outside(range: Option<(usize, usize)>, start: usize, last: usize) -> bool {
    matches!(range, Some((object_start, object_end)) if object_end < start || object_start > last)
}

/// Merge incidents or closures of one leg
pub(crate) fn merge_road_objects<T: GeometryRange>(
    old: Option<&Vec<T>>,
    new: Option<&Vec<T>>,
    start: usize,
    last: usize,
) -> Option<Vec<T>> {
    if old.is_none() && new.is_none() {
        return None;
    }

    let kept = old
        .into_iter()
        .flatten()
        .filter(|object| outside(object.geometry_range(), start, last))
        .cloned();
    let refreshed = new.into_iter().flatten().map(|object| object.shifted(start));

    Some(kept.chain(refreshed).collect())
}

/// Merge notifications of one leg
pub(crate) fn merge_notifications(
    old: Option<&Vec<Notification>>,
    new: Option<&Vec<Notification>>,
    start: usize,
    last: usize,
) -> Option<Vec<Notification>> {
    if old.is_none() && new.is_none() {
        return None;
    }

    let kept = old
        .into_iter()
        .flatten()
        .filter(|notification| {
            !notification.is_dynamic() || outside(notification.geometry_range(), start, last)
        })
        .cloned();
    let refreshed = new.into_iter().flatten().map(|notification| notification.shifted(start));

    Some(kept.chain(refreshed).collect())
}

/// Drop objects reaching past the leg's last point index
pub(crate) fn retain_within_leg<T: GeometryRange>(
    objects: Option<Vec<T>>,
    last_point_index: Option<usize>,
    leg_index: usize,
    kind: &'static str,
) -> Option<Vec<T>> {
    let Some(last_point_index) = last_point_index else {
        return objects;
    };
    objects.map(|objects| {
        objects
            .into_iter()
            .filter(|object| match object.geometry_range() {
                Some((_, end)) if end > last_point_index => {
                    warn!(
                        leg_index = leg_index,
                        kind = kind,
                        end = end,
                        last_point_index = last_point_index,
                        "Dropping road object outside of leg geometry"
                    );
                    false
                }
                _ => true,
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use navroute_types::{Closure, Incident, REFRESH_TYPE_DYNAMIC};

    fn incident(id: &str, start: usize, end: usize) -> Incident {
        Incident {
            id: id.to_string(),
            geometry_index_start: Some(start),
            geometry_index_end: Some(end),
            ..Default::default()
        }
    }

    fn notification(index: Option<usize>, dynamic: bool) -> Notification {
        Notification {
            geometry_index: index,
            refresh_type: dynamic.then(|| REFRESH_TYPE_DYNAMIC.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_incidents_outside_range_are_kept() {
        let old = vec![incident("before", 0, 2), incident("inside", 4, 6), incident("after", 12, 14)];
        let new = vec![incident("new", 1, 2)];

        let merged = merge_road_objects(Some(&old), Some(&new), 3, 10).unwrap();
        let ids: Vec<_> = merged.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["before", "after", "new"]);
        assert_eq!(merged[2].geometry_range(), Some((4, 5)));
    }

    #[test]
    fn test_closures_both_missing() {
        assert!(merge_road_objects::<Closure>(None, None, 0, 5).is_none());
        let new = vec![Closure::new(0, 1)];
        assert_eq!(
            merge_road_objects(None, Some(&new), 2, 5),
            Some(vec![Closure::new(2, 3)])
        );
    }

    #[test]
    fn test_static_notifications_survive() {
        let old = vec![
            notification(Some(5), false),
            notification(Some(5), true),
            notification(Some(1), true),
            notification(None, true),
        ];
        let new = vec![notification(Some(0), true)];

        let merged = merge_notifications(Some(&old), Some(&new), 3, 8).unwrap();
        assert_eq!(merged.len(), 3);
        assert!(!merged[0].is_dynamic());
        assert_eq!(merged[1].geometry_index, Some(1));
        assert_eq!(merged[2].geometry_index, Some(3));
    }

    #[test]
    fn test_retain_within_leg() {
        let objects = vec![Closure::new(0, 4), Closure::new(3, 9)];
        let kept = retain_within_leg(Some(objects.clone()), Some(5), 0, "closure").unwrap();
        assert_eq!(kept, vec![Closure::new(0, 4)]);
        assert_eq!(retain_within_leg(Some(objects.clone()), None, 0, "closure"), Some(objects));
    }
}
