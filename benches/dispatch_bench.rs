// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hostdom::{gateway_fn, DocumentHost, Event, HostValue, RuntimeContext};

const PAGE: &str = r#"
    <!DOCTYPE html>
    <html>
    <head><title>Guest book</title></head>
    <body>
        <div id="content">
            <form action="/add" method="post">
                <p><input type="text" name="guest"></p>
                <p><button>Sign</button></p>
            </form>
            <ul><li>one</li><li>two</li><li>three</li></ul>
        </div>
    </body>
    </html>
"#;

fn html_parsing_benchmark(c: &mut Criterion) {
    c.bench_function("parse_document", |b| {
        b.iter(|| black_box(DocumentHost::parse(black_box(PAGE)).unwrap()))
    });
}

fn query_benchmark(c: &mut Criterion) {
    let ctx = RuntimeContext::with_defaults(Arc::new(DocumentHost::parse(PAGE).unwrap()));

    c.bench_function("query_selector_all", |b| {
        b.iter(|| black_box(ctx.document().query_selector_all("div > ul li").unwrap()))
    });
}

fn dispatch_benchmark(c: &mut Criterion) {
    let ctx = RuntimeContext::with_defaults(Arc::new(DocumentHost::parse(PAGE).unwrap()));
    let button = ctx.document().query_selector("button").unwrap().unwrap();
    let form = ctx.document().query_selector("form").unwrap().unwrap();
    button.add_event_listener("click", |_, _| Ok(()));
    form.add_event_listener("click", |_, event| {
        event.prevent_default();
        Ok(())
    });

    c.bench_function("dispatch_bubbling", |b| {
        b.iter(|| black_box(button.dispatch_event(&mut Event::new("click")).unwrap()))
    });

    // Null host: the only gateway call is the parent lookup
    let local = RuntimeContext::with_defaults(gateway_fn(|_, _| Ok(HostValue::Null)));
    let node = local.node(1);
    for _ in 0..8 {
        node.add_event_listener("input", |_, _| Ok(()));
    }
    c.bench_function("dispatch_local_listeners", |b| {
        b.iter(|| black_box(node.dispatch_event(&mut Event::new("input")).unwrap()))
    });
}

criterion_group!(benches, html_parsing_benchmark, query_benchmark, dispatch_benchmark);
criterion_main!(benches);
