use crate::error::ScanError;
use crate::model::{BoundingBox, DetectionKind, Entry, Skeleton, TextDetection};
use crate::parse::{format_date_key, parse_date, parse_time};
use crate::schema::Column;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pub entries: Vec<Entry>,
    /// Word detections whose centre fell outside every cell.
    pub discarded: usize,
    pub non_words: usize,
}

/// Centre of a fractional bounding box in skeleton pixels, truncated.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn center(bounding_box: &BoundingBox, skeleton: &Skeleton) -> (i64, i64) {
    let width = f64::from(skeleton.width);
    let height = f64::from(skeleton.height);
    let x = bounding_box.left * width + bounding_box.width * width / 2.0;
    let y = bounding_box.top * height + bounding_box.height * height / 2.0;
    (x as i64, y as i64)
}

fn parse_entry_time(entry: &Entry, text: &str) -> Result<chrono::NaiveDateTime, ScanError> {
    let Some(date) = entry.date else {
        return Err(ScanError::TimeParseFailure {
            date: String::new(),
            text: text.to_string(),
        });
    };
    parse_time(&format_date_key(date), text)
}

/// Buckets word detections into the cells of a rebased, reconciled skeleton.
///
/// Detections are visited left to right so several words in one activity
/// cell concatenate in reading order; this also puts every date before the
/// times of its row. Any unparsable date or time aborts the whole scan.
pub fn assign_cells(
    detections: &[TextDetection],
    skeleton: &Skeleton,
) -> Result<Assignment, ScanError> {
    let mut assignment = Assignment {
        entries: vec![Entry::default(); skeleton.rows.len()],
        ..Assignment::default()
    };

    let mut words = Vec::with_capacity(detections.len());
    for detection in detections {
        if detection.kind == DetectionKind::Word {
            words.push(detection);
        } else {
            assignment.non_words += 1;
        }
    }
    words.sort_by(|a, b| a.bounding_box.left.total_cmp(&b.bounding_box.left));

    for detection in words {
        let (x, y) = center(&detection.bounding_box, skeleton);
        let (Ok(col), Ok(row)) = (skeleton.col_at(x), skeleton.row_at(y)) else {
            tracing::debug!(text = %detection.text, x, y, "detection outside grid");
            assignment.discarded += 1;
            continue;
        };
        let (Some(column), Some(entry)) =
            (Column::from_index(col), assignment.entries.get_mut(row))
        else {
            assignment.discarded += 1;
            continue;
        };

        let text = detection.text.as_str();
        match column {
            Column::Date => entry.date = Some(parse_date(text)?),
            Column::Activity => entry.activity.push_str(text),
            Column::In => entry.in_time = Some(parse_entry_time(entry, text)?),
            Column::Out => entry.out_time = Some(parse_entry_time(entry, text)?),
        }
    }

    Ok(assignment)
}

/// Entries only, for callers that do not need the noise counters.
pub fn scan(detections: &[TextDetection], skeleton: &Skeleton) -> Result<Vec<Entry>, ScanError> {
    assign_cells(detections, skeleton).map(|assignment| assignment.entries)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Timelike};

    use super::{assign_cells, center, scan};
    use crate::error::ScanError;
    use crate::model::{BoundingBox, Col, DetectionKind, Point, Row, Skeleton, TextDetection};

    // 200x40 frame, rows [0,20] [20,40], cols [0,40] [80,140] [140,170] [170,200].
    fn skeleton() -> Skeleton {
        Skeleton {
            width: 200,
            height: 40,
            rows: vec![
                Row {
                    num: 0,
                    top: 0,
                    bottom: 20,
                },
                Row {
                    num: 1,
                    top: 20,
                    bottom: 40,
                },
            ],
            cols: vec![
                Col {
                    num: 0,
                    left: 0,
                    right: 40,
                },
                Col {
                    num: 1,
                    left: 80,
                    right: 140,
                },
                Col {
                    num: 2,
                    left: 140,
                    right: 170,
                },
                Col {
                    num: 3,
                    left: 170,
                    right: 200,
                },
            ],
            origin: Point::default(),
        }
    }

    fn word(text: &str, center_x: f64, center_y: f64) -> TextDetection {
        TextDetection::word(
            text,
            BoundingBox {
                left: (center_x - 4.0) / 200.0,
                top: (center_y - 3.0) / 40.0,
                width: 8.0 / 200.0,
                height: 6.0 / 40.0,
            },
        )
    }

    #[test]
    fn center_scales_fractions_by_frame() {
        let detection = word("x", 100.5, 30.5);
        assert_eq!(center(&detection.bounding_box, &skeleton()), (100, 30));
    }

    #[test]
    fn fills_entries_by_row_and_column() {
        let detections = vec![
            word("08.47", 155.0, 10.0),
            word("05/01/2023", 20.0, 10.0),
            word("Day", 125.0, 10.0),
            word("Unclosed", 95.0, 10.0),
            word("06/01/2023", 20.0, 30.0),
            word("0900", 155.0, 30.0),
            word("1715", 185.0, 30.0),
        ];

        let assignment = assign_cells(&detections, &skeleton()).expect("scan should succeed");
        let [first, second] = assignment.entries.as_slice() else {
            panic!("expected two entries");
        };

        assert_eq!(first.date, NaiveDate::from_ymd_opt(2023, 1, 5));
        assert_eq!(first.activity, "UnclosedDay");
        assert_eq!(first.in_time.map(|t| (t.hour(), t.minute())), Some((8, 47)));
        assert_eq!(first.out_time, None);

        assert_eq!(second.activity, "");
        assert_eq!(second.out_time.map(|t| (t.hour(), t.minute())), Some((17, 15)));
        assert_eq!(assignment.discarded, 0);
    }

    #[test]
    fn drops_non_words_and_detections_outside_cells() {
        let mut line = word("05/01/2023 UnclosedDay", 20.0, 10.0);
        line.kind = DetectionKind::Line;
        let detections = vec![
            line,
            word("margin", 60.0, 10.0),
            word("footer", 20.0, 39.9 + 10.0),
        ];

        let assignment = assign_cells(&detections, &skeleton()).expect("noise is not fatal");
        assert_eq!(assignment.non_words, 1);
        assert_eq!(assignment.discarded, 2);
        assert!(assignment.entries.iter().all(|entry| entry.date.is_none()));
    }

    #[test]
    fn bad_date_aborts_scan() {
        let err = assign_cells(&[word("Date", 20.0, 10.0)], &skeleton())
            .expect_err("header text is not a date");
        assert!(matches!(err, ScanError::UnrecognizedDateFormat(_)));
    }

    #[test]
    fn scan_returns_one_entry_per_row() {
        let entries = scan(&[word("Sick", 95.0, 32.0)], &skeleton()).expect("scan should succeed");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].activity, "Sick");
    }

    #[test]
    fn time_without_date_fails() {
        let err = assign_cells(&[word("0900", 155.0, 30.0)], &skeleton())
            .expect_err("time needs the row date");
        assert!(matches!(err, ScanError::TimeParseFailure { .. }));
    }
}
