use booking_engine::{
    find_double_bookings, generate_slots, try_reserve, Booking, BookingId, OwnerId, ScheduleRules,
    Service,
};
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// A month of bookings, every other half hour taken on each day.
fn busy_month() -> Vec<Booking> {
    let first = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut bookings = Vec::new();
    for day in 0..30 {
        for half_hour in (0..16).step_by(2) {
            bookings.push(Booking {
                id: BookingId::new(),
                date: first + Duration::days(day),
                time: NaiveTime::from_hms_opt(9, 0, 0).unwrap() + Duration::minutes(half_hour * 30),
                client_name: "Client".to_string(),
                client_contact: "555-0100".to_string(),
                service: Service::Haircut,
                booked_by: OwnerId::new("bench"),
                created_at: created,
            });
        }
    }
    bookings
}

fn bench_slots(c: &mut Criterion) {
    let rules = ScheduleRules::default();
    let bookings = busy_month();
    let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let now = NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();

    c.bench_function("generate_slots/busy_month", |b| {
        b.iter(|| generate_slots(black_box(&rules), black_box(date), black_box(&bookings), now))
    });

    let time = NaiveTime::from_hms_opt(16, 30, 0).unwrap();
    c.bench_function("try_reserve/busy_month", |b| {
        b.iter(|| try_reserve(black_box(&rules), black_box(date), black_box(time), &bookings))
    });

    c.bench_function("find_double_bookings/busy_month", |b| {
        b.iter(|| find_double_bookings(black_box(&bookings), rules.slot))
    });
}

criterion_group!(benches, bench_slots);
criterion_main!(benches);
