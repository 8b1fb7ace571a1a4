use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use chimera_beans::prelude::*;

const THREADS: usize = 8;

struct Expensive {
    id: usize,
}

fn counting_class(counter: &Arc<AtomicUsize>) -> Arc<BeanClass> {
    let counter = counter.clone();
    BeanClass::builder::<Expensive>("Expensive")
        .constructor(move |_| {
            let id = counter.fetch_add(1, Ordering::SeqCst);
            // 让其它线程有机会在创建过程中进入 get_bean
            thread::sleep(Duration::from_millis(20));
            Ok(Expensive { id })
        })
        .build()
}

fn request_concurrently(factory: &Arc<DefaultListableBeanFactory>, name: &str) -> Vec<Arc<Expensive>> {
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let factory = factory.clone();
            let barrier = barrier.clone();
            let name = name.to_string();
            thread::spawn(move || {
                barrier.wait();
                factory.get_bean_as::<Expensive>(&name).unwrap()
            })
        })
        .collect();

    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn concurrent_singleton_requests_create_one_instance() {
    let counter = Arc::new(AtomicUsize::new(0));
    let factory = Arc::new(DefaultListableBeanFactory::new());
    factory
        .register_bean_definition(
            "expensive",
            RootBeanDefinition::with_class(counting_class(&counter)).into(),
        )
        .unwrap();

    let beans = request_concurrently(&factory, "expensive");

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(beans.iter().all(|bean| Arc::ptr_eq(bean, &beans[0])));
    assert_eq!(beans[0].id, 0);
}

#[test]
fn concurrent_prototype_requests_create_fresh_instances() {
    let counter = Arc::new(AtomicUsize::new(0));
    let factory = Arc::new(DefaultListableBeanFactory::new());
    factory
        .register_bean_definition(
            "expensive",
            RootBeanDefinition::with_class(counting_class(&counter))
                .with_scope(Scope::Prototype)
                .into(),
        )
        .unwrap();

    let beans = request_concurrently(&factory, "expensive");

    assert_eq!(counter.load(Ordering::SeqCst), THREADS);
    let mut ids: Vec<usize> = beans.iter().map(|bean| bean.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), THREADS);
}

#[test]
fn concurrent_alias_and_name_requests_share_the_singleton() {
    let counter = Arc::new(AtomicUsize::new(0));
    let factory = Arc::new(DefaultListableBeanFactory::new());
    factory
        .register_bean_definition(
            "expensive",
            RootBeanDefinition::with_class(counting_class(&counter)).into(),
        )
        .unwrap();
    factory.register_alias("expensive", "cheap").unwrap();

    let by_name = {
        let factory = factory.clone();
        thread::spawn(move || factory.get_bean("expensive").unwrap())
    };
    let by_alias = {
        let factory = factory.clone();
        thread::spawn(move || factory.get_bean("cheap").unwrap())
    };

    let by_name = by_name.join().unwrap();
    let by_alias = by_alias.join().unwrap();
    assert!(Arc::ptr_eq(&by_name, &by_alias));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
