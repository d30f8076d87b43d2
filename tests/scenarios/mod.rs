use std::time::Duration;

use barbershop::{
    Admission, Customer, EventRecorder, RejectionReason, Shop, ShopEvent, ShopInput,
};
use rstest::rstest;
use tokio::sync::mpsc;

use crate::{
    assert_elapsed,
    types::{admitted, config, drain, finished, started},
};

/// Given one chair and one barber
/// When two customers walk in at the same moment, before the barber has looked up
/// Then the first sits down and the second leaves
#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn one_chair_second_customer_leaves() {
    tokio::time::pause();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let shop = Shop::start(config(1, 1), tx).unwrap();

    assert_eq!(shop.arrive(0), Admission::Admitted);
    assert_eq!(
        shop.arrive(1),
        Admission::Rejected(RejectionReason::RoomFull)
    );

    shop.close();
    shop.join().await.unwrap();

    let events = drain(&mut rx);
    assert_eq!(finished(&events), vec![0]);
}

/// Given one chair and one barber
/// When the barber takes the first customer before the second walks in
/// Then the second customer gets the chair
#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn one_chair_second_customer_sits_once_barber_is_busy() {
    tokio::time::pause();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let shop = Shop::start(config(1, 1), tx).unwrap();

    assert_eq!(shop.arrive(0), Admission::Admitted);

    // The barber has taken customer 0 out of the waiting room
    loop {
        if let Some(ShopEvent::ServiceStarted { customer: 0, .. }) = rx.recv().await {
            break;
        }
    }
    assert_eq!(shop.waiting(), 0);

    assert_eq!(shop.arrive(1), Admission::Admitted);

    shop.close();
    shop.join().await.unwrap();

    let events = drain(&mut rx);
    assert_eq!(finished(&events), vec![0, 1]);
}

/// Given five chairs and two barbers
/// When six customers turn up at once
/// Then five sit down in order, one leaves, and both barbers drain the room
#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn five_chairs_two_barbers_six_customers() {
    tokio::time::pause();

    let recorder = EventRecorder::new();
    let shop = Shop::start(config(5, 2), recorder.clone()).unwrap();

    let start = tokio::time::Instant::now();
    shop.schedule_arrivals(Customer::from_delays([Duration::ZERO; 6]))
        .wait()
        .await
        .unwrap();

    shop.close();
    shop.join().await.unwrap();

    // Two barbers, five customers, three seconds each
    assert_elapsed!(start, Duration::from_secs(9), Duration::from_millis(2));

    let events = recorder.events();
    assert_eq!(admitted(&events), vec![0, 1, 2, 3, 4]);
    assert!(events.contains(&ShopEvent::CustomerRejected {
        customer: 5,
        reason: RejectionReason::RoomFull
    }));
    assert_eq!(started(&events), vec![0, 1, 2, 3, 4]);

    let summary = recorder.summary();
    assert_eq!(summary.served, 5);
    assert_eq!(summary.served_by_barber.len(), 2, "both barbers should work");
    assert!(summary.closed);
}

/// Given customers scheduled on either side of closing time
/// When the shop closes in between
/// Then the late customers are turned away because the shop is closing
#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn late_arrivals_are_turned_away() {
    tokio::time::pause();

    let recorder = EventRecorder::new();
    let shop = Shop::start(config(5, 1), recorder.clone()).unwrap();

    let arrivals = shop.schedule_arrivals(Customer::from_delays(
        [0, 1, 10, 1].map(Duration::from_secs),
    ));

    tokio::time::sleep(Duration::from_secs(5)).await;
    shop.close();

    arrivals.wait().await.unwrap();
    shop.join().await.unwrap();

    let summary = recorder.summary();
    assert_eq!(summary.admitted, 2);
    assert_eq!(summary.rejected_closing, 2);
    assert_eq!(summary.served, 2);
}

/// Given customers scheduled without keeping hold of the timeline
/// When the shop stays open long enough
/// Then every one of them still walks in
#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn scheduled_customers_arrive_without_waiting_on_them() {
    tokio::time::pause();

    let recorder = EventRecorder::new();
    let shop = Shop::start(config(5, 1), recorder.clone()).unwrap();

    shop.schedule_arrivals(Customer::from_delays([Duration::from_secs(1); 3]));

    tokio::time::sleep(Duration::from_secs(10)).await;
    shop.close();
    shop.join().await.unwrap();

    let summary = recorder.summary();
    assert_eq!(summary.admitted, 3);
    assert_eq!(summary.served, 3);
}

/// Given a complete input file
/// When the whole day is run
/// Then everyone who got a chair is served and the shop closes
#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn run_a_whole_day() {
    tokio::time::pause();

    let input: ShopInput = "2 2 2\n0\n0\n0\n0\n4\n".parse().unwrap();

    let recorder = EventRecorder::new();
    let start = tokio::time::Instant::now();
    barbershop::run(&input, recorder.clone()).await.unwrap();

    let summary = recorder.summary();
    // Two chairs: customers 0 and 1 sit down, 2 and 3 leave. The barbers are free again by the
    // time customer 4 turns up at t=4.
    assert_eq!(summary.admitted, 3);
    assert_eq!(summary.rejected_room_full, 2);
    assert_eq!(summary.served, 3);
    assert!(summary.closed);

    assert_elapsed!(start, Duration::from_secs(7), Duration::from_millis(2));
}

/// Given more customers than chairs, arriving in bursts
/// When they are admitted and served
/// Then the waiting room never holds more people than it has chairs, and nobody admitted is lost
#[rstest]
#[case(0, 1)]
#[case(1, 1)]
#[case(3, 2)]
#[case(5, 3)]
#[tokio::test]
async fn never_more_waiting_than_chairs(#[case] chairs: usize, #[case] barbers: usize) {
    tokio::time::pause();

    let recorder = EventRecorder::new();
    let shop = Shop::start(config(chairs, barbers), recorder.clone()).unwrap();

    let delays = [0, 0, 1, 0, 2, 0, 0, 3, 1, 0, 0, 0, 5, 0];
    shop.schedule_arrivals(Customer::from_delays(delays.map(Duration::from_secs)))
        .wait()
        .await
        .unwrap();

    shop.close();
    shop.join().await.unwrap();

    let events = recorder.events();

    let mut waiting = 0usize;
    for event in &events {
        match event {
            ShopEvent::CustomerAdmitted { .. } => waiting += 1,
            ShopEvent::ServiceStarted { .. } => waiting -= 1,
            _ => {}
        }
        assert!(waiting <= chairs, "{waiting} waiting with only {chairs} chairs");
    }
    assert_eq!(waiting, 0, "everyone should have been served");

    let mut admitted = admitted(&events);
    let mut finished = finished(&events);
    admitted.sort();
    finished.sort();
    assert_eq!(admitted, finished);

    let summary = recorder.summary();
    assert_eq!(summary.admitted + summary.rejected(), delays.len());
    if chairs == 0 {
        assert_eq!(summary.served, 0);
    }
}
