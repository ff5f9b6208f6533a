use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Utc;
use tracing::{debug, error};

use crate::display::StatusSink;
use crate::report::cloud::MetricSink;
use crate::report::csv::CsvSink;
use crate::sense::{Measurement, Thermometer};

/// Fixed-period deadline sequence. If a tick overruns one or more deadlines,
/// the next wait returns immediately and the extra missed deadlines are
/// dropped rather than caught up on.
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Ticker::starting_at(Instant::now() + period, period)
    }

    fn starting_at(first_deadline: Instant, period: Duration) -> Self {
        Ticker {
            period,
            next: first_deadline,
        }
    }

    pub fn wait(&mut self) {
        let sleep_for = self.advance(Instant::now());
        if !sleep_for.is_zero() {
            std::thread::sleep(sleep_for);
        }
    }

    /// Moves to the next deadline and returns how long to sleep for it.
    fn advance(&mut self, now: Instant) -> Duration {
        if now < self.next {
            let sleep_for = self.next - now;
            self.next += self.period;
            return sleep_for;
        }

        // At least one deadline elapsed while the tick ran.
        let mut missed = 0u64;
        while self.next <= now {
            self.next += self.period;
            missed += 1;
        }
        if missed > 1 {
            debug!(skipped = missed - 1, "ticks skipped");
        }
        Duration::ZERO
    }
}

/// Reads one measurement per tick and fans it out to the enabled sinks.
/// A sensor failure aborts the loop; a sink failure is logged with enough
/// context to diagnose and the remaining sinks, and the next tick, still
/// run.
pub struct PollLoop<T, C, S> {
    sensor: T,
    csv: CsvSink,
    cloud: Option<C>,
    screen: Option<S>,
}

impl<T, C, S> PollLoop<T, C, S>
where
    T: Thermometer,
    C: MetricSink,
    S: StatusSink,
{
    pub fn new(sensor: T, csv: CsvSink, cloud: Option<C>, screen: Option<S>) -> Self {
        PollLoop {
            sensor,
            csv,
            cloud,
            screen,
        }
    }

    pub fn run(&mut self, period: Duration) -> anyhow::Result<()> {
        let mut ticker = Ticker::new(period);
        loop {
            self.tick()?;
            ticker.wait();
        }
    }

    pub fn tick(&mut self) -> anyhow::Result<()> {
        let celsius = self.sensor.sense_celsius().context("sensor read")?;
        let measurement = Measurement {
            at: Utc::now(),
            celsius,
        };
        debug!(celsius, "measured");

        let epoch = measurement.epoch_secs();
        if let Err(err) = self.csv.append(&measurement) {
            error!(epoch, celsius, "failed to append reading: {err:#}");
        }

        if let Some(cloud) = self.cloud.as_mut() {
            if let Err(err) = cloud.report(measurement.celsius, measurement.at) {
                error!(epoch, celsius, "failed to report reading to cloud: {err:#}");
            }
        }

        if let Some(screen) = self.screen.as_mut() {
            let status = format!("{:.2} C", measurement.celsius);
            if let Err(err) = screen.render(&status) {
                error!(epoch, celsius, "failed to update screen: {err:#}");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::collections::VecDeque;
    use std::path::PathBuf;

    struct ScriptedThermometer {
        readings: VecDeque<Result<f64, &'static str>>,
    }

    impl ScriptedThermometer {
        fn new(readings: &[Result<f64, &'static str>]) -> Self {
            ScriptedThermometer {
                readings: readings.iter().copied().collect(),
            }
        }
    }

    impl Thermometer for ScriptedThermometer {
        fn sense_celsius(&mut self) -> anyhow::Result<f64> {
            match self.readings.pop_front().expect("script exhausted") {
                Ok(celsius) => Ok(celsius),
                Err(message) => Err(anyhow::anyhow!(message)),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        reported: Vec<f64>,
        calls: usize,
        fail_on_call: Option<usize>,
    }

    impl MetricSink for RecordingSink {
        fn report(&mut self, value: f64, _at: DateTime<Utc>) -> anyhow::Result<()> {
            self.calls += 1;
            if self.fail_on_call == Some(self.calls) {
                anyhow::bail!("simulated submission failure");
            }
            self.reported.push(value);
            Ok(())
        }
    }

    struct BrokenScreen;

    impl StatusSink for BrokenScreen {
        fn render(&mut self, _status: &str) -> anyhow::Result<()> {
            anyhow::bail!("panel did not ack")
        }
    }

    fn csv_sink(name: &str) -> (CsvSink, PathBuf) {
        let path = PathBuf::from(format!("./target/{name}.csv"));
        std::fs::remove_file(&path).ok();
        (CsvSink::open(&path).unwrap(), path)
    }

    fn read_rows(path: &PathBuf) -> Vec<(f64, f64)> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| {
                let (ts, value) = line.split_once(',').expect("two columns");
                (ts.parse().unwrap(), value.parse().unwrap())
            })
            .collect()
    }

    #[test]
    fn test_three_ticks_reach_file_and_cloud_in_order() {
        let (csv, path) = csv_sink("poll_three_ticks");
        let sensor = ScriptedThermometer::new(&[Ok(21.5), Ok(21.7), Ok(21.6)]);
        let mut poll = PollLoop::<_, _, BrokenScreen>::new(
            sensor,
            csv,
            Some(RecordingSink::default()),
            None,
        );

        for _ in 0..3 {
            poll.tick().unwrap();
            std::thread::sleep(Duration::from_millis(2));
        }

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        let values: Vec<f64> = rows.iter().map(|&(_, value)| value).collect();
        assert_eq!(values, vec![21.5, 21.7, 21.6]);
        for pair in rows.windows(2) {
            assert!(pair[1].0 > pair[0].0, "timestamps not increasing: {rows:?}");
        }
        assert_eq!(poll.cloud.unwrap().reported, vec![21.5, 21.7, 21.6]);
    }

    #[test]
    fn test_cloud_failure_does_not_stop_file_writes_or_later_ticks() {
        let (csv, path) = csv_sink("poll_cloud_failure");
        let sensor = ScriptedThermometer::new(&[Ok(21.5), Ok(21.7), Ok(21.6)]);
        let cloud = RecordingSink {
            fail_on_call: Some(2),
            ..RecordingSink::default()
        };
        let mut poll = PollLoop::<_, _, BrokenScreen>::new(sensor, csv, Some(cloud), None);

        for _ in 0..3 {
            poll.tick().unwrap();
        }

        assert_eq!(read_rows(&path).len(), 3);
        let cloud = poll.cloud.unwrap();
        assert_eq!(cloud.calls, 3);
        assert_eq!(cloud.reported, vec![21.5, 21.6]);
    }

    #[test]
    fn test_screen_failure_is_not_fatal() {
        let (csv, path) = csv_sink("poll_screen_failure");
        let sensor = ScriptedThermometer::new(&[Ok(20.0), Ok(20.1)]);
        let mut poll = PollLoop::<_, RecordingSink, _>::new(sensor, csv, None, Some(BrokenScreen));

        poll.tick().unwrap();
        poll.tick().unwrap();
        assert_eq!(read_rows(&path).len(), 2);
    }

    #[test]
    fn test_sensor_failure_is_fatal() {
        let (csv, _path) = csv_sink("poll_sensor_failure");
        let sensor = ScriptedThermometer::new(&[Ok(20.0), Err("bus gone")]);
        let mut poll =
            PollLoop::<_, RecordingSink, BrokenScreen>::new(sensor, csv, None, None);

        poll.tick().unwrap();
        let err = poll.tick().unwrap_err();
        assert!(format!("{err:#}").contains("sensor read"));
    }

    #[test]
    fn test_disabled_sinks_mean_no_outbound_calls() {
        let (csv, path) = csv_sink("poll_no_sinks");
        let sensor = ScriptedThermometer::new(&[Ok(19.5)]);
        let mut poll =
            PollLoop::<_, RecordingSink, BrokenScreen>::new(sensor, csv, None, None);
        poll.tick().unwrap();
        assert_eq!(read_rows(&path).len(), 1);
    }

    #[test]
    fn test_ticker_sleeps_out_the_remainder_of_the_period() {
        let base = Instant::now();
        let period = Duration::from_millis(100);
        let mut ticker = Ticker::starting_at(base + period, period);

        assert_eq!(ticker.advance(base + Duration::from_millis(30)), Duration::from_millis(70));
        // Second deadline is at 200ms regardless of when the wait started.
        assert_eq!(
            ticker.advance(base + Duration::from_millis(130)),
            Duration::from_millis(70)
        );
    }

    #[test]
    fn test_ticker_drops_missed_deadlines_without_catch_up() {
        let base = Instant::now();
        let period = Duration::from_millis(100);
        let mut ticker = Ticker::starting_at(base + period, period);

        // The tick overran deadlines at 100ms and 200ms: fire immediately,
        // then resume the grid at 300ms.
        assert_eq!(ticker.advance(base + Duration::from_millis(250)), Duration::ZERO);
        assert_eq!(
            ticker.advance(base + Duration::from_millis(260)),
            Duration::from_millis(40)
        );
    }
}
