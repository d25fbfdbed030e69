//! Ordering of records by how close they are to a subject record.
//!
//! When a vertex stands for several physical copies, the copy shown first
//! should be the one the user most likely means: the copy next to the
//! image they opened. Keys, most significant first:
//!
//! 1. same album as the subject,
//! 2. same collection root,
//! 3. smallest absolute modification-time difference (unknown times last),
//! 4. longest common file-name prefix,
//! 5. ascending id.

use std::cmp::{Ordering, Reverse};

use crate::record::ImageRecord;

/// Compare `a` and `b` by proximity to `subject`; `Less` means `a` is closer.
#[must_use]
pub fn proximity_cmp(subject: &ImageRecord, a: &ImageRecord, b: &ImageRecord) -> Ordering {
    let same_album = |r: &ImageRecord| r.album_id.is_some() && r.album_id == subject.album_id;
    let same_root =
        |r: &ImageRecord| r.album_root_id.is_some() && r.album_root_id == subject.album_root_id;

    Reverse(same_album(a))
        .cmp(&Reverse(same_album(b)))
        .then_with(|| Reverse(same_root(a)).cmp(&Reverse(same_root(b))))
        .then_with(|| time_distance(subject, a).cmp(&time_distance(subject, b)))
        .then_with(|| {
            let pa = common_prefix_len(&subject.file_name, &a.file_name);
            let pb = common_prefix_len(&subject.file_name, &b.file_name);
            pb.cmp(&pa)
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort `records` closest-first.
pub fn sort_by_proximity(subject: &ImageRecord, records: &mut [ImageRecord]) {
    records.sort_by(|a, b| proximity_cmp(subject, a, b));
}

/// `(unknown, millis)`: known distances sort before unknown ones.
fn time_distance(subject: &ImageRecord, r: &ImageRecord) -> (bool, i64) {
    match (subject.modified, r.modified) {
        (Some(s), Some(t)) => (false, (t - s).num_milliseconds().abs()),
        _ => (true, 0),
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ImageId;
    use chrono::{Duration, TimeZone, Utc};

    fn rec(id: i64, name: &str) -> ImageRecord {
        ImageRecord::new(ImageId(id), "/p", name)
    }

    #[test]
    fn album_beats_root_beats_time() {
        let t0 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let subject = rec(1, "img.jpg").in_album(10, 100).modified_at(t0);
        let same_album = rec(5, "zzz.jpg").in_album(11, 100);
        let same_root = rec(4, "img.jpg").in_album(10, 101).modified_at(t0);
        let close_time = rec(3, "zzz.jpg").modified_at(t0 + Duration::seconds(1));
        let far_time = rec(2, "zzz.jpg").modified_at(t0 + Duration::days(3));

        let mut records = vec![
            far_time.clone(),
            close_time.clone(),
            same_root.clone(),
            same_album.clone(),
        ];
        sort_by_proximity(&subject, &mut records);
        let ids: Vec<i64> = records.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![5, 4, 3, 2]);
    }

    #[test]
    fn name_prefix_then_id() {
        let subject = rec(1, "holiday_001.jpg");
        let mut records = vec![rec(9, "other.jpg"), rec(8, "holiday_001_v2.jpg"), rec(7, "other.jpg")];
        sort_by_proximity(&subject, &mut records);
        let ids: Vec<i64> = records.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![8, 7, 9]);
    }

    #[test]
    fn prefix_length_counts_characters() {
        assert_eq!(common_prefix_len("abc", "abd"), 2);
        assert_eq!(common_prefix_len("", "x"), 0);
        assert_eq!(common_prefix_len("äb", "äc"), 1);
    }
}
