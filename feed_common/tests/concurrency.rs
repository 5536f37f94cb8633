//! Concurrent producers against one subject.
//!
//! Every producer goes through `Subject::set_data`; whatever the interleaving,
//! each distinct payload value may be delivered at most once in a row and the
//! file always ends up holding the last delivered payload.

use crossbeam_channel::unbounded;
use feed_common::persistence::read_payload;
use feed_common::sink::ChannelSink;
use feed_common::{Category, Delivery, QuoteObserver, Subject};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

fn payload(name: &str, price: f64) -> String {
    format!(r#"[{{"name":"{}","last_price":{},"change_percentage":0.1}}]"#, name, price)
}

#[test]
fn same_value_from_many_threads_is_delivered_once() {
    let dir = TempDir::new().unwrap();
    let subject = Subject::shared(Category::Forex, dir.path().join("forex_data.json"));
    let (tx, rx) = unbounded();
    subject
        .subscribe(QuoteObserver::new("a", Category::Forex, Box::new(ChannelSink::new(tx))).into_handle())
        .unwrap();

    let producers = 16;
    let barrier = Arc::new(Barrier::new(producers));
    let value = payload("EURUSD", 1.08);

    let handles: Vec<_> = (0..producers)
        .map(|_| {
            let subject = Arc::clone(&subject);
            let barrier = Arc::clone(&barrier);
            let value = value.clone();
            thread::spawn(move || {
                barrier.wait();
                subject.set_data(&value).unwrap()
            })
        })
        .collect();

    let notified = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|d| matches!(d, Delivery::Notified { .. }))
        .count();

    assert_eq!(notified, 1);
    assert_eq!(rx.try_iter().count(), 1);
    assert_eq!(read_payload(subject.persist_path()).unwrap(), value);
}

#[test]
fn racing_values_settle_on_last_delivery() {
    let dir = TempDir::new().unwrap();
    let subject = Subject::shared(Category::Forex, dir.path().join("forex_data.json"));
    let (tx, rx) = unbounded();
    let observer = QuoteObserver::new("a", Category::Forex, Box::new(ChannelSink::new(tx))).into_handle();
    subject.subscribe(observer.clone()).unwrap();

    let producers = 4;
    let rounds = 50;
    let barrier = Arc::new(Barrier::new(producers));
    let handles: Vec<_> = (0..producers)
        .map(|i| {
            let subject = Arc::clone(&subject);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..rounds {
                    let price = (round % 3) as f64 + i as f64 / 10.0;
                    subject.set_data(&payload("EURUSD", price)).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let batches: Vec<_> = rx.try_iter().collect();
    assert!(!batches.is_empty());
    for pair in batches.windows(2) {
        assert_ne!(pair[0].values, pair[1].values, "consecutive deliveries must differ");
    }

    let last = subject.last_notified().unwrap();
    assert_eq!(read_payload(subject.persist_path()).unwrap(), last);
    assert_eq!(subject.current_payload().unwrap(), last);
    let held = observer.lock().unwrap().values().to_vec();
    assert_eq!(held, batches.last().unwrap().values);
}

#[test]
fn subscribing_while_producers_run_is_safe() {
    let dir = TempDir::new().unwrap();
    let subject = Subject::shared(Category::Commodity, dir.path().join("materials_data.json"));

    let producer = {
        let subject = Arc::clone(&subject);
        thread::spawn(move || {
            for i in 0..200 {
                subject.set_data(&payload("LCO", 80.0 + i as f64)).unwrap();
            }
        })
    };

    let mut observers = Vec::new();
    for i in 0..20 {
        let handle = QuoteObserver::with_log_sink(format!("sub-{}", i), Category::Commodity).into_handle();
        subject.subscribe(handle.clone()).unwrap();
        observers.push(handle);
    }
    for handle in observers.iter().step_by(2) {
        assert!(subject.unsubscribe(handle).unwrap());
    }
    producer.join().unwrap();

    assert_eq!(subject.observer_count().unwrap(), 10);
    subject.set_data(&payload("LCO", 1.0)).unwrap();
    for handle in observers.iter().skip(1).step_by(2) {
        assert_eq!(handle.lock().unwrap().values()[0].price(), 1.0);
    }
}
