use crate::domain::recommendation::Recommendation;

/// Drops repeated titles, stable-sorts by priority and keeps the first `max`.
pub fn rank_and_limit(recommendations: Vec<Recommendation>, max: usize) -> Vec<Recommendation> {
    let mut out: Vec<Recommendation> = Vec::with_capacity(recommendations.len());
    for rec in recommendations {
        if out.iter().any(|existing| existing.title == rec.title) {
            continue;
        }
        out.push(rec);
    }

    // `sort_by_key` is stable: equal priorities keep evaluation order.
    out.sort_by_key(|r| r.priority);
    out.truncate(max);
    out
}
