use crate::core::DataPoint;

/// One contiguous subgroup of the measurement series.
///
/// Stages are rebuilt from scratch on every chart update: the partitioner
/// creates them, the control-limit calculator fills `ucl`/`lcl` (or flags
/// `mr_error`), and they are read-only afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub label: String,
    /// Inclusive index of the first point belonging to this stage.
    pub first_id: usize,
    /// Inclusive index of the last point belonging to this stage.
    pub last_id: usize,
    pub start_x: f64,
    pub end_x: f64,
    /// Boundary toward the next stage: the numeric midpoint between this
    /// stage's last point and the next stage's first point. For the final
    /// stage this equals `end_x`.
    pub divider_x: f64,
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub ucl: Option<f64>,
    pub lcl: Option<f64>,
    /// Set when the moving-range window is wider than the stage population,
    /// in which case no control limits exist for the stage.
    pub mr_error: bool,
}

struct RunningStage {
    label: String,
    first_id: usize,
    start_x: f64,
    sum: f64,
    count: usize,
}

impl RunningStage {
    fn close(self, last_id: usize, end_x: f64, divider_x: f64) -> Stage {
        Stage {
            label: self.label,
            first_id: self.first_id,
            last_id,
            start_x: self.start_x,
            end_x,
            divider_x,
            count: self.count,
            sum: self.sum,
            mean: self.sum / self.count as f64,
            ucl: None,
            lcl: None,
            mr_error: false,
        }
    }
}

/// Splits the ordered point series into contiguous stages wherever the
/// parallel label series changes value.
///
/// Without labels the entire series forms one stage with an empty label.
/// The returned stages cover `0..points.len()` in input order with no gaps
/// and no overlaps.
pub fn partition_stages(points: &[DataPoint], labels: Option<&[String]>) -> Vec<Stage> {
    let Some(first) = points.first() else {
        return Vec::new();
    };

    let label_at = |index: usize| -> &str {
        labels
            .and_then(|all| all.get(index))
            .map(String::as_str)
            .unwrap_or("")
    };

    let mut stages = Vec::new();
    let mut running = RunningStage {
        label: label_at(0).to_owned(),
        first_id: 0,
        start_x: first.x,
        sum: first.y,
        count: 1,
    };

    for (index, point) in points.iter().enumerate().skip(1) {
        let label = label_at(index);
        if label == running.label {
            running.sum += point.y;
            running.count += 1;
            continue;
        }

        // Label change: the closed stage ends at the previous point and the
        // divider sits halfway between the two neighboring points.
        let previous = points[index - 1];
        let divider_x = (previous.x + point.x) / 2.0;
        stages.push(running.close(index - 1, previous.x, divider_x));

        running = RunningStage {
            label: label.to_owned(),
            first_id: index,
            start_x: point.x,
            sum: point.y,
            count: 1,
        };
    }

    let last = points[points.len() - 1];
    stages.push(running.close(points.len() - 1, last.x, last.x));
    stages
}
