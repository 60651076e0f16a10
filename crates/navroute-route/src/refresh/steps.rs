//! Step and route duration reconciliation

use navroute_types::{DirectionsWaypoint, LegAnnotation, LegStep, RouteLeg};
use tracing::{debug, error};

/// Redistribute merged annotation durations over the leg's steps.
///
/// Every step consumes `points - 1` duration entries. A step with fewer than
/// two points makes redistribution impossible and the current steps are
/// returned as they are. Encoded step geometries are decoded with
/// `precision`.
pub(crate) fn redistribute_step_durations(
    steps: &[LegStep],
    merged: Option<&LegAnnotation>,
    leg_index: usize,
    precision: u32,
) -> Vec<LegStep> {
    let Some(durations) = merged.and_then(|annotation| annotation.duration.as_ref()) else {
        return steps.to_vec();
    };

    let mut result = Vec::with_capacity(steps.len());
    let mut consumed = 0;
    for (step_index, step) in steps.iter().enumerate() {
        let points = step.point_count(precision);
        if points < 2 {
            error!(
                leg_index = leg_index,
                step_index = step_index,
                points = points,
                "Step has less than 2 points, unable to update durations"
            );
            return steps.to_vec();
        }
        let segments = points - 1;
        let duration = durations.iter().skip(consumed).take(segments).sum();
        result.push(LegStep {
            duration,
            ..step.clone()
        });
        consumed += segments;
    }
    result
}

/// Route duration as the sum of leg durations plus charging time.
///
/// `None` when any leg lacks a duration.
pub(crate) fn route_duration(legs: &[RouteLeg], waypoints: Option<&Vec<DirectionsWaypoint>>) -> Option<f64> {
    let mut total = 0.0;
    for leg in legs {
        total += leg.duration?;
    }
    for (index, waypoint) in waypoints.into_iter().flatten().enumerate() {
        if let Some(value) = waypoint.raw_charge_time() {
            match value.as_f64() {
                Some(charge_time) => total += charge_time,
                None => debug!(waypoint = index, value = %value, "Ignoring non-numeric charge time"),
            }
        }
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use navroute_types::LineString;
    use serde_json::json;

    fn step(points: usize, duration: f64) -> LegStep {
        LegStep {
            duration,
            geometry: Some(LineString::new(vec![[0.0, 0.0]; points]).into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_redistribute() {
        let steps = vec![step(3, 0.0), step(2, 0.0), step(3, 0.0)];
        let annotation = LegAnnotation {
            duration: Some(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ..Default::default()
        };

        let updated = redistribute_step_durations(&steps, Some(&annotation), 0, 6);
        let durations: Vec<f64> = updated.iter().map(|s| s.duration).collect();
        assert_eq!(durations, vec![3.0, 3.0, 9.0]);
    }

    #[test]
    fn test_degenerate_step_keeps_durations() {
        let steps = vec![step(3, 11.0), step(1, 12.0)];
        let annotation = LegAnnotation {
            duration: Some(vec![1.0, 2.0]),
            ..Default::default()
        };

        let updated = redistribute_step_durations(&steps, Some(&annotation), 0, 6);
        assert_eq!(updated, steps);
    }

    #[test]
    fn test_redistribute_over_encoded_steps() {
        let steps: Vec<LegStep> = serde_json::from_value(json!([
            { "distance": 20.0, "duration": 0.0, "geometry": "???_ibE?_ibE" },
            { "distance": 30.0, "duration": 0.0, "geometry": "?_seK?_ibE?_ibE?_ibE" }
        ]))
        .unwrap();
        let annotation = LegAnnotation {
            duration: Some(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ..Default::default()
        };

        let updated = redistribute_step_durations(&steps, Some(&annotation), 0, 6);
        let durations: Vec<f64> = updated.iter().map(|s| s.duration).collect();
        assert_eq!(durations, vec![3.0, 12.0]);
    }

    #[test]
    fn test_route_duration_with_charge_time() {
        let legs = vec![
            RouteLeg {
                duration: Some(100.0),
                ..Default::default()
            },
            RouteLeg {
                duration: Some(50.0),
                ..Default::default()
            },
        ];
        let waypoints: Vec<DirectionsWaypoint> = serde_json::from_value(json!([
            { "location": [0.0, 0.0] },
            { "location": [1.0, 1.0], "metadata": { "charge_time": 30 } },
            { "location": [2.0, 2.0], "metadata": { "charge_time": "n/a" } }
        ]))
        .unwrap();

        assert_eq!(route_duration(&legs, Some(&waypoints)), Some(180.0));

        let missing = vec![RouteLeg::default()];
        assert_eq!(route_duration(&missing, Some(&waypoints)), None);
    }
}
