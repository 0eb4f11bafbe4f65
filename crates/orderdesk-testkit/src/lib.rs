// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod mock;

pub use mock::{MockOrderService, RecordedRequest};

use orderdesk_app::{FieldSet, KNOWN_STATUSES};
use time::macros::date;
use time::{Date, Duration};

const REFERENCE_DATE: Date = date!(2024 - 01 - 01);

const CARRIER_PREFIXES: [&str; 5] = ["1Z", "94", "JD", "TBA", "FX"];

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

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

pub struct OrderFaker {
    rng: DeterministicRng,
}

impl OrderFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn order_fields(&mut self) -> FieldSet {
        let status = self.status();
        let tracking_number = if matches!(status, "shipped" | "delivered" | "returned") {
            self.tracking_number()
        } else {
            String::new()
        };
        FieldSet {
            order_id: String::new(),
            customer_id: self.customer_id(),
            status: status.to_owned(),
            order_date: self.order_date().to_string(),
            discount_amount: self.discount_amount(),
            tracking_number,
        }
    }

    pub fn customer_id(&mut self) -> String {
        (1_000 + self.rng.int_n(9_000)).to_string()
    }

    pub fn status(&mut self) -> &'static str {
        KNOWN_STATUSES[self.rng.int_n(KNOWN_STATUSES.len())]
    }

    pub fn order_date(&mut self) -> Date {
        REFERENCE_DATE + Duration::days(self.rng.int_n(366) as i64)
    }

    pub fn discount_amount(&mut self) -> String {
        if self.rng.bool() {
            return "0.0".to_owned();
        }
        let cents = 50 * (1 + self.rng.int_n(40));
        format!("{}.{:02}", cents / 100, cents % 100)
    }

    pub fn tracking_number(&mut self) -> String {
        let prefix = CARRIER_PREFIXES[self.rng.int_n(CARRIER_PREFIXES.len())];
        let mut number = String::from(prefix);
        for _ in 0..10 {
            number.push(char::from(b'0' + self.rng.int_n(10) as u8));
        }
        number
    }
}

#[cfg(test)]
mod tests {
    use super::OrderFaker;
    use orderdesk_app::KNOWN_STATUSES;

    #[test]
    fn same_seed_same_orders() {
        let mut left = OrderFaker::new(42);
        let mut right = OrderFaker::new(42);
        for _ in 0..10 {
            assert_eq!(left.order_fields(), right.order_fields());
        }
    }

    #[test]
    fn order_fields_are_plausible() {
        let mut faker = OrderFaker::new(7);
        for _ in 0..50 {
            let fields = faker.order_fields();
            assert!(fields.order_id.is_empty());
            assert!(fields.customer_id.parse::<u32>().is_ok());
            assert!(KNOWN_STATUSES.contains(&fields.status.as_str()));
            assert_eq!(fields.order_date.len(), 10);
            assert!(fields.order_date.starts_with("2024-") || fields.order_date == "2025-01-01");
            assert!(fields.discount_amount.parse::<f64>().is_ok());
            if fields.status == "pending" {
                assert!(fields.tracking_number.is_empty());
            }
        }
    }

    #[test]
    fn tracking_numbers_have_carrier_prefix_and_digits() {
        let mut faker = OrderFaker::new(3);
        let number = faker.tracking_number();
        let digits = number.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        assert!(digits.len() >= 10);
        assert!(number.chars().rev().take(10).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn zero_seed_is_normalized() {
        let mut zero = OrderFaker::new(0);
        let mut one = OrderFaker::new(1);
        assert_eq!(zero.order_fields(), one.order_fields());
    }
}
