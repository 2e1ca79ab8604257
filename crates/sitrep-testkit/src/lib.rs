// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use sitrep_app::{
    Incident, IncidentId, IncidentSeverity, IncidentStatus, MediaAttachment, Member, Permission,
    Report, ReportId, User, UserId,
};
use time::{Date, Duration, Month, OffsetDateTime, Time};

const REFERENCE_YEAR: i32 = 2026;

const INCIDENT_KINDS: [&str; 8] = [
    "Fire",
    "Flood",
    "Chemical Spill",
    "Building Collapse",
    "Disease Outbreak",
    "Road Accident",
    "Civil Unrest",
    "Oil Pipeline Leak",
];

const STATES: [&str; 8] = [
    "Lagos", "Kano", "Rivers", "Oyo", "Kaduna", "Enugu", "Borno", "Plateau",
];

const LOCAL_GOVS: [&str; 10] = [
    "Ikeja",
    "Surulere",
    "Port Harcourt",
    "Ibadan North",
    "Jos South",
    "Maiduguri",
    "Enugu East",
    "Kaduna North",
    "Nassarawa",
    "Obio-Akpor",
];

const FIRST_NAMES: [&str; 16] = [
    "Ada", "Chinedu", "Ngozi", "Emeka", "Aisha", "Tunde", "Ifeoma", "Musa", "Bola", "Uche",
    "Yemi", "Halima", "Kunle", "Zainab", "Seun", "Obi",
];

const LAST_NAMES: [&str; 16] = [
    "Okafor",
    "Bello",
    "Adeyemi",
    "Eze",
    "Abubakar",
    "Okonkwo",
    "Balogun",
    "Ibrahim",
    "Nwosu",
    "Lawal",
    "Ogunleye",
    "Chukwu",
    "Danjuma",
    "Adesina",
    "Umar",
    "Onyeka",
];

const REPORT_STATUSES: [&str; 3] = ["new", "reviewed", "escalated"];

const RESOURCE_NOTES: [&str; 6] = [
    "two fire trucks, one ambulance",
    "mobile clinic and relief tents",
    "evacuation buses on standby",
    "hazmat team and containment booms",
    "search and rescue unit deployed",
    "water tankers and food supplies",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0xD6E8_FEB8_6659_FD93;
        if state == 0 {
            state = 0x853C_49E6_748F_EA9B;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(2_862_933_555_777_941_757)
            .wrapping_add(3_037_000_493);

        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
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

/// Seeded generator for service-shaped incident data. Identifiers are
/// minted from per-entity counters, so two fakers with the same seed
/// produce identical collections.
#[derive(Debug, Clone)]
pub struct IncidentFaker {
    rng: DeterministicRng,
    next_incident: u32,
    next_user: u32,
    next_report: u32,
}

impl IncidentFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_incident: 1,
            next_user: 1,
            next_report: 1,
        }
    }

    pub fn user(&mut self) -> User {
        let id = UserId::from(format!("u-{:04}", self.next_user));
        self.next_user += 1;

        let first = self.pick(&FIRST_NAMES).to_owned();
        let last = self.pick(&LAST_NAMES).to_owned();
        // Some records carry a precomposed full name, some leave the
        // display rule to fall back to first/last.
        let full_name = self.rng.bool().then(|| format!("{first} {last}"));
        let email = format!(
            "{}.{}@sitrep.example",
            first.to_lowercase(),
            last.to_lowercase()
        );

        User {
            id,
            first_name: first,
            last_name: last,
            full_name,
            email,
        }
    }

    pub fn users(&mut self, count: usize) -> Vec<User> {
        (0..count).map(|_| self.user()).collect()
    }

    pub fn report(&mut self) -> Report {
        let id = ReportId::from(format!("r-{:04}", self.next_report));
        self.next_report += 1;

        let sender = format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES));
        let media = if self.rng.bool() {
            vec![MediaAttachment {
                kind: "image".to_owned(),
                url: format!("https://media.sitrep.example/{}.jpg", id.get()),
                name: "scene photo".to_owned(),
            }]
        } else {
            Vec::new()
        };

        Report {
            id,
            sender,
            sender_img: String::new(),
            title: self.sentence(3, 6),
            body: self.sentence(12, 40),
            status: self.pick(&REPORT_STATUSES).to_owned(),
            media,
        }
    }

    /// One incident with members drawn from `users` (never duplicated) and
    /// zero to two nested reports.
    pub fn incident(&mut self, users: &[User]) -> Incident {
        let id = IncidentId::from(format!("inc-{:04}", self.next_incident));
        self.next_incident += 1;

        let kind = self.pick(&INCIDENT_KINDS);
        let titles = incident_titles(kind);
        let title = self.pick(titles).to_owned();
        let status = IncidentStatus::ALL[self.rng.int_n(IncidentStatus::ALL.len())];
        let severity = IncidentSeverity::ALL[self.rng.int_n(IncidentSeverity::ALL.len())];

        let mut members = Vec::new();
        if !users.is_empty() {
            let count = self.rng.int_n(users.len().min(3) + 1);
            for offset in 0..count {
                let user = &users[(self.rng.int_n(users.len()) + offset) % users.len()];
                if !members
                    .iter()
                    .any(|member: &Member| member.user == user.id)
                {
                    members.push(Member {
                        user: user.id.clone(),
                        permission: Permission::ALL[self.rng.int_n(Permission::ALL.len())],
                    });
                }
            }
        }

        let reports = (0..self.rng.int_n(3)).map(|_| self.report()).collect();
        let occurred = self.random_datetime_between(
            reference_now() - Duration::days(365),
            reference_now(),
        );
        let created_by = members
            .first()
            .map(|member| member.user.get().to_owned())
            .unwrap_or_default();

        Incident {
            id,
            title,
            kind: kind.to_owned(),
            status: status.as_str().to_owned(),
            severity: severity.as_str().to_owned(),
            summary: self.sentence(8, 20),
            response: self.sentence(6, 14),
            description: self.sentence(12, 30),
            date: occurred.date().to_string(),
            state: self.pick(&STATES).to_owned(),
            local_gov: self.pick(&LOCAL_GOVS).to_owned(),
            affected_population: self.rng.next_u64() % 5_000,
            casualties: self.rng.next_u64() % 50,
            witnesses: self.rng.next_u64() % 20,
            resources: self.pick(&RESOURCE_NOTES).to_owned(),
            members,
            reports,
            created_by,
            created_at: Some(occurred),
            updated_at: Some(occurred + Duration::hours(6)),
        }
    }

    pub fn incidents(&mut self, count: usize, users: &[User]) -> Vec<Incident> {
        (0..count).map(|_| self.incident(users)).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn random_datetime_between(
        &mut self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> OffsetDateTime {
        let start_ts = start.unix_timestamp();
        let end_ts = end.unix_timestamp();
        if end_ts <= start_ts {
            return start;
        }
        let span = (end_ts - start_ts) as u64;
        let offset = self.rng.next_u64() % (span + 1);
        OffsetDateTime::from_unix_timestamp(start_ts + offset as i64).expect("valid unix timestamp")
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        const WORDS: [&str; 24] = [
            "responders",
            "evacuated",
            "containment",
            "reported",
            "casualties",
            "spreading",
            "secured",
            "perimeter",
            "relief",
            "shelter",
            "supplies",
            "assessment",
            "damage",
            "flooded",
            "residents",
            "dispatched",
            "roadblock",
            "volunteers",
            "hospital",
            "overnight",
            "stabilized",
            "downtown",
            "warehouse",
            "bridge",
        ];

        let span = max_words.saturating_sub(min_words);
        let count = min_words + self.rng.int_n(span + 1);
        let mut parts = Vec::with_capacity(count);
        for _ in 0..count {
            parts.push(self.pick(&WORDS).to_owned());
        }
        let mut sentence = parts.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }
}

pub fn incident_kinds() -> &'static [&'static str] {
    &INCIDENT_KINDS
}

fn reference_now() -> OffsetDateTime {
    midnight_utc(REFERENCE_YEAR, Month::January, 1)
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    let date = Date::from_calendar_date(year, month, day).expect("valid calendar date");
    let midnight = Time::from_hms(0, 0, 0).expect("valid midnight");
    date.with_time(midnight).assume_utc()
}

fn incident_titles(kind: &str) -> &'static [&'static str] {
    match kind {
        "Fire" => &["Fire in Bay 4", "Market stall fire", "Warehouse blaze off Ring Road"],
        "Flood" => &["River overflow at Eleko", "Flash flood under the bridge"],
        "Chemical Spill" => &["Tanker spill on the expressway", "Solvent leak at the depot"],
        "Building Collapse" => &["Two-storey collapse in Yaba", "Scaffolding failure downtown"],
        "Disease Outbreak" => &["Cholera cluster in camp 3", "Measles cases at the border"],
        "Road Accident" => &["Multi-vehicle pileup at toll gate", "Bus rollover on A2"],
        "Civil Unrest" => &["Protest blockade at junction", "Market dispute turned violent"],
        "Oil Pipeline Leak" => &["Pipeline rupture near creek", "Manifold leak at pump station"],
        _ => &["Unclassified incident"],
    }
}

#[cfg(test)]
mod tests {
    use super::{IncidentFaker, incident_kinds};
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_same_collection() {
        let mut left = IncidentFaker::new(42);
        let mut right = IncidentFaker::new(42);

        let users = left.users(4);
        assert_eq!(users, right.users(4));
        assert_eq!(left.incidents(5, &users), right.incidents(5, &users));
    }

    #[test]
    fn seed_zero_is_normalized() {
        let mut zero = IncidentFaker::new(0);
        let mut one = IncidentFaker::new(1);
        assert_eq!(zero.incident(&[]), one.incident(&[]));
    }

    #[test]
    fn incidents_cover_multiple_kinds() {
        let mut faker = IncidentFaker::new(7);
        let kinds: BTreeSet<String> = faker
            .incidents(24, &[])
            .into_iter()
            .map(|incident| incident.kind)
            .collect();
        assert!(kinds.len() > 3);
        for kind in &kinds {
            assert!(incident_kinds().contains(&kind.as_str()));
        }
    }

    #[test]
    fn members_come_from_the_user_pool_without_duplicates() {
        let mut faker = IncidentFaker::new(11);
        let users = faker.users(5);
        for incident in faker.incidents(12, &users) {
            let mut seen = BTreeSet::new();
            for member in &incident.members {
                assert!(users.iter().any(|user| user.id == member.user));
                assert!(seen.insert(member.user.clone()), "duplicate member entry");
            }
        }
    }

    #[test]
    fn generated_users_always_have_a_display_name() {
        let mut faker = IncidentFaker::new(3);
        for user in faker.users(10) {
            assert!(!user.display_name().trim().is_empty());
            assert!(user.email.contains('@'));
        }
    }
}
