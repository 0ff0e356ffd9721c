use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hotel_booking_client::admin::BookingFilter;
use hotel_booking_client::models::{Booking, BookingStatus, Id, Room};
use hotel_booking_client::pricing::compute_booking;
use hotel_booking_client::search::{paginate, RoomFilter};
use rand::{seq::SliceRandom, thread_rng, Rng};

const ROOM_TYPES: [&str; 4] = ["single", "double", "suite", "family"];

fn random_rooms(count: usize) -> Vec<Room> {
    let mut rng = thread_rng();
    (0..count)
        .map(|i| Room {
            id: Id::from(i as u64),
            room_type: ROOM_TYPES.choose(&mut rng).unwrap().to_string(),
            name: format!("Room {}", i),
            description: format!("Quiet room on floor {}", i % 12),
            price: rng.gen_range(40.0..900.0),
            capacity: rng.gen_range(1..6),
            amenities: vec!["wifi".to_string()],
            photo_url: None,
            bookings: Vec::new(),
        })
        .collect()
}

fn random_bookings(count: usize) -> Vec<Booking> {
    let mut rng = thread_rng();
    let base = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let statuses = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
    ];
    (0..count)
        .map(|i| {
            let check_in = base + Duration::days(rng.gen_range(0..60));
            Booking {
                id: Id::from(i as u64),
                room_id: Some(Id::from(rng.gen_range(0..200u64))),
                user_id: Some(Id::from(rng.gen_range(0..500u64))),
                check_in_date: check_in,
                check_out_date: check_in + Duration::days(rng.gen_range(1..14)),
                status: *statuses.choose(&mut rng).unwrap(),
                total_price: rng.gen_range(40.0..5000.0),
                created_at: None,
                user_name: format!("Guest {}", i),
                user_email: format!("guest{}@example.com", i),
                room_name: format!("Room {}", i % 200),
                confirmation_code: None,
            }
        })
        .collect()
}

pub fn pricing_benchmark(c: &mut Criterion) {
    let check_in = NaiveDate::from_ymd_opt(2025, 6, 1);
    let check_out = NaiveDate::from_ymd_opt(2025, 6, 14);

    c.bench_function("compute_booking", |b| {
        b.iter(|| {
            compute_booking(
                black_box(189.5),
                black_box(check_in),
                black_box(check_out),
                black_box(2),
                black_box(1),
            )
        })
    });
}

pub fn filter_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("listing_filters");

    for size in [100, 1_000, 10_000].iter() {
        let rooms = random_rooms(*size);
        let bookings = random_bookings(*size);

        let room_filter = RoomFilter {
            room_type: Some("suite".to_string()),
            search_term: Some("floor 3".to_string()),
            max_price: Some(500.0),
            min_capacity: Some(2),
        };
        group.bench_with_input(BenchmarkId::new("rooms", size), &rooms, |b, rooms| {
            b.iter(|| {
                let filtered = room_filter.apply(rooms);
                black_box(paginate(&filtered, 2, 5).len())
            })
        });

        let booking_filter = BookingFilter {
            search_term: Some("guest1".to_string()),
            status: Some(BookingStatus::Confirmed),
        };
        group.bench_with_input(BenchmarkId::new("bookings", size), &bookings, |b, bookings| {
            b.iter(|| black_box(booking_filter.apply(bookings)))
        });
    }

    group.finish();
}

criterion_group!(benches, pricing_benchmark, filter_benchmark);
criterion_main!(benches);
