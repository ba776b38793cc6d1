//! Per-appliance analysis pipeline.
//!
//! Each appliance gets its own [`ChangeFinder`], constructed right before its
//! scoring pass and dropped right after, so no estimator state ever crosses
//! appliances. Appliances are independent and are analysed in parallel.

use crate::changepoint::ChangeFinder;
use crate::config::AnalysisConfig;
use crate::core::{DailySignal, PowerReadings};
use crate::detection::{classify, FaultVerdict};
use crate::error::{GreenwaveError, Result};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Score and classify one appliance's daily signal.
pub fn analyze_signal(signal: &DailySignal, config: &AnalysisConfig) -> Result<FaultVerdict> {
    config.validate()?;

    if signal.len() < config.classifier.min_points {
        return Err(GreenwaveError::InsufficientData {
            needed: config.classifier.min_points,
            got: signal.len(),
        });
    }

    let scores = {
        let mut finder = ChangeFinder::for_appliance(signal.appliance(), config.estimator)?;
        finder.score_signal(signal)?
    };

    let verdict = classify(signal, &scores, &config.classifier)?;

    debug!(
        appliance = %verdict.appliance,
        lower = verdict.band.lower,
        upper = verdict.band.upper,
        out_of_band = verdict.out_of_band.len(),
        "computed threshold band"
    );
    info!(
        appliance = %verdict.appliance,
        status = ?verdict.status,
        avg_power = verdict.avg_power,
        last_power = verdict.last_power,
        power_ratio = verdict.power_ratio(),
        anomalous_unclassified = verdict.anomalous_unclassified,
        "appliance classified"
    );

    Ok(verdict)
}

/// Resample raw readings to daily means, then analyse them.
pub fn analyze_readings(readings: &PowerReadings, config: &AnalysisConfig) -> Result<FaultVerdict> {
    let signal = readings.resample_daily()?;
    analyze_signal(&signal, config)
}

/// Outcome for one appliance of a household run.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplianceOutcome {
    pub appliance: String,
    pub result: Result<FaultVerdict>,
}

/// Results of analysing several appliances, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HouseholdReport {
    outcomes: Vec<ApplianceOutcome>,
}

impl HouseholdReport {
    pub fn outcomes(&self) -> &[ApplianceOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome for a named appliance.
    pub fn get(&self, appliance: &str) -> Option<&ApplianceOutcome> {
        self.outcomes.iter().find(|o| o.appliance == appliance)
    }

    /// Every successfully classified appliance.
    pub fn verdicts(&self) -> impl Iterator<Item = &FaultVerdict> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Appliances classified as overconsuming or malfunctioning.
    pub fn faulty(&self) -> impl Iterator<Item = &FaultVerdict> {
        self.verdicts().filter(|v| v.is_fault())
    }

    /// Appliances skipped for lack of daily history.
    pub fn insufficient(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(&o.result, Err(e) if e.is_insufficient_data()))
            .map(|o| o.appliance.as_str())
    }

    /// Appliances that failed for any other reason.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &GreenwaveError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Err(e) if !e.is_insufficient_data() => Some((o.appliance.as_str(), e)),
            _ => None,
        })
    }
}

/// Analyse many appliances in parallel; a failing appliance never affects the others.
pub fn analyze_household(signals: &[DailySignal], config: &AnalysisConfig) -> HouseholdReport {
    run_household(signals, |signal| {
        (signal.appliance().to_string(), analyze_signal(signal, config))
    })
}

/// Resample and analyse many appliances' raw readings in parallel.
pub fn analyze_household_readings(
    readings: &[PowerReadings],
    config: &AnalysisConfig,
) -> HouseholdReport {
    run_household(readings, |r| {
        (r.appliance().to_string(), analyze_readings(r, config))
    })
}

fn run_household<T, F>(inputs: &[T], analyze: F) -> HouseholdReport
where
    T: Sync,
    F: Fn(&T) -> (String, Result<FaultVerdict>) + Sync,
{
    let outcomes: Vec<ApplianceOutcome> = inputs
        .par_iter()
        .map(|input| {
            let (appliance, result) = analyze(input);
            match &result {
                Err(e) if e.is_insufficient_data() => {
                    warn!(appliance = %appliance, reason = %e, "appliance skipped");
                }
                Err(e) => {
                    warn!(appliance = %appliance, error = %e, "analysis failed");
                }
                Ok(_) => {}
            }
            ApplianceOutcome { appliance, result }
        })
        .collect();

    let report = HouseholdReport { outcomes };
    info!(
        appliances = report.len(),
        faulty = report.faulty().count(),
        insufficient = report.insufficient().count(),
        failed = report.failed().count(),
        "household analysis complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::FaultStatus;
    use chrono::NaiveDate;

    fn signal(name: &str, values: Vec<f64>) -> DailySignal {
        let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        DailySignal::from_values(name, start, values).unwrap()
    }

    fn flat_then(name: &str, last: f64) -> DailySignal {
        let mut values = vec![5.0; 29];
        values.push(last);
        signal(name, values)
    }

    #[test]
    fn analyze_signal_detects_overconsumption() {
        let config = AnalysisConfig::default();
        let verdict = analyze_signal(&flat_then("Fridge", 20.0), &config).unwrap();
        assert_eq!(verdict.status, FaultStatus::Overconsumption);
        assert_eq!(verdict.scores.len(), 30);
        assert!(verdict.out_of_band.contains(&29));
    }

    #[test]
    fn analyze_signal_rejects_short_history() {
        let short = signal("Fridge", vec![1.0, 2.0, 3.0]);
        let err = analyze_signal(&short, &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err, GreenwaveError::InsufficientData { needed: 4, got: 3 });
    }

    #[test]
    fn analyze_signal_rejects_invalid_config() {
        let mut config = AnalysisConfig::default();
        config.estimator.smooth = 0;
        let err = analyze_signal(&flat_then("Fridge", 5.0), &config).unwrap_err();
        assert!(matches!(err, GreenwaveError::InvalidParameter(_)));
    }

    #[test]
    fn household_keeps_input_order_and_isolates_failures() {
        let signals = vec![
            flat_then("Fridge", 20.0),
            signal("Wine cellar", vec![1.0, 1.0]),
            flat_then("Microwave", 0.5),
            flat_then("Dishwasher", 5.0),
        ];

        let report = analyze_household(&signals, &AnalysisConfig::default());

        let names: Vec<&str> = report
            .outcomes()
            .iter()
            .map(|o| o.appliance.as_str())
            .collect();
        let expected = ["Fridge", "Wine cellar", "Microwave", "Dishwasher"];
        assert_eq!(names, expected);

        let faulty: Vec<(&str, FaultStatus)> =
            report.faulty().map(|v| (v.appliance.as_str(), v.status)).collect();
        assert_eq!(
            faulty,
            vec![
                ("Fridge", FaultStatus::Overconsumption),
                ("Microwave", FaultStatus::Malfunction)
            ]
        );
        let insufficient: Vec<&str> = report.insufficient().collect();
        assert_eq!(insufficient, vec!["Wine cellar"]);
        assert_eq!(report.failed().count(), 0);
        assert_eq!(report.verdicts().count(), 3);
        assert_eq!(
            report.get("Dishwasher").unwrap().result.as_ref().unwrap().status,
            FaultStatus::Normal
        );
    }

    #[test]
    fn empty_household_gives_empty_report() {
        let report = analyze_household(&[], &AnalysisConfig::default());
        assert!(report.is_empty());
        assert_eq!(report.faulty().count(), 0);
    }
}
