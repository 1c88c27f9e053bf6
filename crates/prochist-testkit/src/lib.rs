// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use prochist_app::InstanceRecord;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const REFERENCE_YEAR: i32 = 2026;

const PROCESS_KEYS: [&str; 8] = [
    "invoice-approval",
    "order-fulfillment",
    "report-export",
    "payroll-run",
    "data-sync",
    "customer-onboarding",
    "claim-review",
    "batch-archive",
];

const BUSINESS_PREFIXES: [&str; 6] = ["order", "claim", "case", "batch", "run", "ticket"];

const STATES: [&str; 4] = [
    "ACTIVE",
    "COMPLETED",
    "COMPLETED",
    "EXTERNALLY_TERMINATED",
];

struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic generator of plausible process instances. Same seed, same
/// instances; used by demo mode and by sort/table tests.
pub struct InstanceFaker {
    rng: DeterministicRng,
    counter: u64,
}

impl InstanceFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            counter: 0,
        }
    }

    pub fn instance(&mut self) -> InstanceRecord {
        self.counter += 1;
        let key = self.pick(&PROCESS_KEYS);
        let state = self.pick(&STATES);

        let start = self.datetime_in_reference_year();
        let (start_time, end_time) = match state {
            "ACTIVE" => (Some(start), None),
            _ => {
                let runtime = Duration::minutes(self.rng.int_n(600) as i64 + 1);
                (Some(start), Some(start + runtime))
            }
        };

        // Roughly one in five instances was started without a business key.
        let business_key = if self.rng.int_n(5) == 0 {
            None
        } else {
            Some(format!(
                "{}-{:04}",
                self.pick(&BUSINESS_PREFIXES),
                self.rng.int_n(10_000)
            ))
        };

        InstanceRecord {
            id: format!("{key}:{:08x}-{:04}", self.rng.next_u64() as u32, self.counter),
            state: state.to_owned(),
            business_key,
            start_time,
            end_time,
        }
    }

    pub fn instances(&mut self, count: usize) -> Vec<InstanceRecord> {
        (0..count).map(|_| self.instance()).collect()
    }

    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        pool[self.rng.int_n(pool.len())]
    }

    fn datetime_in_reference_year(&mut self) -> OffsetDateTime {
        let day_offset = self.rng.int_n(364) as i64;
        let seconds = self.rng.int_n(86_400) as i64;
        midnight_utc(REFERENCE_YEAR, Month::January, 1)
            + Duration::days(day_offset)
            + Duration::seconds(seconds)
    }
}

pub fn fixture_instance(id: &str, state: &str) -> InstanceRecord {
    InstanceRecord {
        id: id.to_owned(),
        state: state.to_owned(),
        business_key: None,
        start_time: Some(midnight_utc(REFERENCE_YEAR, Month::February, 19)),
        end_time: None,
    }
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    let date = Date::from_calendar_date(year, month, day).expect("valid calendar date");
    let midnight = Time::from_hms(0, 0, 0).expect("valid midnight");
    OffsetDateTime::new_utc(date, midnight)
}
