//! Parallel resolution over a fixed-size worker pool.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{info, warn};

use crate::error::{EnrichError, Result};
use crate::resolve::{PointResolver, ResolutionMap, ResolutionStatus};
use crate::survey::SurveyPoint;

/// Fans one resolution task per unique point out over a rayon pool.
///
/// Tasks are independent and the resolver (with its catalog/index) is
/// shared read-only by reference, so no locking is involved. Results are
/// keyed by survey id, which makes completion order unobservable.
pub struct Dispatcher {
    pool: ThreadPool,
}

impl Dispatcher {
    /// Create a dispatcher with a fixed number of workers.
    ///
    /// `workers == 0` uses all available cores.
    pub fn new(workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| EnrichError::InputFormat(format!("invalid worker pool size: {e}")))?;

        info!("Dispatcher ready with {} workers", pool.current_num_threads());
        Ok(Self { pool })
    }

    /// Resolve every point, producing exactly one status per survey id.
    pub fn resolve_all(
        &self,
        points: &[SurveyPoint],
        resolver: &dyn PointResolver,
    ) -> ResolutionMap {
        let pb = ProgressBar::new(points.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }

        let map: ResolutionMap = self.pool.install(|| {
            points
                .par_iter()
                .map(|point| {
                    let status = resolver.resolve(point);
                    pb.inc(1);
                    (point.id.clone(), status)
                })
                .collect()
        });

        pb.finish_and_clear();

        debug_assert_eq!(map.len(), points.len());

        let mut resolved = 0usize;
        let mut unresolved = 0usize;
        let mut failed = 0usize;
        for status in map.values() {
            match status {
                ResolutionStatus::Resolved(_) => resolved += 1,
                ResolutionStatus::Unresolved => unresolved += 1,
                ResolutionStatus::Failed(_) => failed += 1,
            }
        }

        info!(
            "Resolved {} points ({} outside all regions, {} failed)",
            resolved, unresolved, failed
        );
        if failed > 0 {
            warn!("{} points failed to resolve and were nulled", failed);
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EvenIdResolver;

    impl PointResolver for EvenIdResolver {
        fn columns(&self) -> &'static [&'static str] {
            &["parity"]
        }

        fn resolve(&self, point: &SurveyPoint) -> ResolutionStatus {
            match point.id.parse::<u64>() {
                Ok(n) if n % 2 == 0 => ResolutionStatus::Resolved(vec!["even".to_string()]),
                Ok(_) => ResolutionStatus::Unresolved,
                Err(e) => ResolutionStatus::Failed(e.to_string()),
            }
        }
    }

    #[test]
    fn test_one_resolution_per_point() {
        let points: Vec<SurveyPoint> = (0..100)
            .map(|i| SurveyPoint {
                id: i.to_string(),
                lat: 0.0,
                lon: 0.0,
            })
            .collect();

        let dispatcher = Dispatcher::new(2).unwrap();
        let map = dispatcher.resolve_all(&points, &EvenIdResolver);

        assert_eq!(map.len(), 100);
        assert_eq!(
            map["42"],
            ResolutionStatus::Resolved(vec!["even".to_string()])
        );
        assert_eq!(map["7"], ResolutionStatus::Unresolved);
    }

    #[test]
    fn test_failed_points_do_not_abort_the_batch() {
        let points = vec![
            SurveyPoint {
                id: "2".to_string(),
                lat: 0.0,
                lon: 0.0,
            },
            SurveyPoint {
                id: "not-a-number".to_string(),
                lat: 0.0,
                lon: 0.0,
            },
        ];

        let dispatcher = Dispatcher::new(1).unwrap();
        let map = dispatcher.resolve_all(&points, &EvenIdResolver);

        assert_eq!(map.len(), 2);
        assert!(matches!(map["not-a-number"], ResolutionStatus::Failed(_)));
    }
}
