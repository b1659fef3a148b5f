// src/optimizer/segmenter.rs - Grouping of program locations into independently controllable motions

use dxm_shared::Waypoint;

/// Contiguous run of joint via locations within one operation.
///
/// The first waypoint is the start point of the motion and has no travel leg of its own; every
/// later waypoint ends one travel leg. A motion always holds at least two waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    waypoints: Vec<Waypoint>,
}

impl Motion {
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub(crate) fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Sum of the travel-leg durations, excluding the start point.
    pub fn duration(&self) -> f64 {
        self.travel_legs().map(|wp| wp.duration).sum()
    }

    /// Leaf indices of the waypoints whose speed setting drives this motion.
    pub fn actuated_waypoints(&self) -> Vec<usize> {
        self.travel_legs().map(|wp| wp.index).collect()
    }

    pub fn total_distance(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|leg| leg[0].position.distance_to(&leg[1].position))
            .sum()
    }

    /// Distance travelled upwards; downward legs do not count.
    pub fn total_vertical_distance(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|leg| leg[0].position.vertical_distance_to(&leg[1].position))
            .filter(|dz| *dz > 0.0)
            .sum()
    }

    /// Refreshes the leg durations from a newer snapshot of the same program.
    pub fn sync_durations(&mut self, locations: &[Waypoint]) {
        for wp in &mut self.waypoints {
            if let Some(latest) = locations.get(wp.index) {
                wp.duration = latest.duration;
            }
        }
    }

    fn travel_legs(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter().skip(1)
    }
}

fn flush(motions: &mut Vec<Motion>, current: &mut Vec<Waypoint>) {
    if !current.is_empty() {
        motions.push(Motion {
            waypoints: std::mem::take(current),
        });
    }
}

/// Splits the leaf locations of a program into motions.
///
/// Linear and process locations end the current motion and are never part of its travel legs,
/// though they may be the start point of the next one. A change of parent operation also ends
/// the current motion; the first location of the new operation only starts the next search.
pub fn segment_motions(locations: &[Waypoint]) -> Vec<Motion> {
    let mut motions = Vec::new();
    let mut current: Vec<Waypoint> = Vec::new();

    for pair in locations.windows(2) {
        let (previous, location) = (&pair[0], &pair[1]);

        if previous.parent != location.parent {
            flush(&mut motions, &mut current);
            continue;
        }

        if location.is_joint_via() {
            if current.is_empty() {
                current.push(previous.clone());
            }
            current.push(location.clone());
        } else {
            flush(&mut motions, &mut current);
        }
    }

    flush(&mut motions, &mut current);
    motions
}
