use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use httpmsg::protocol::Message;

const REQUEST: &[u8] = b"POST /session/7/actions HTTP/1.1\r\n\
Host: localhost:8100\r\n\
User-Agent: curl/7.79.1\r\n\
Accept: */*\r\n\
Content-Type: application/json\r\n\
Content-Length: 13\r\n\
\r\n\
{\"actions\":1}";

fn bench_parse_request(c: &mut Criterion) {
    c.bench_function("parse_request", |b| {
        b.iter(|| {
            let mut message = Message::inbound();
            message.append_data(black_box(REQUEST)).unwrap();
            assert!(message.is_complete());
            message
        })
    });
}

fn bench_serialize_response(c: &mut Criterion) {
    let mut response = Message::response(200, "OK", http::Version::HTTP_11).unwrap();
    response.set_header_field("Content-Type", "application/json").unwrap();
    response.set_header_field("Content-Length", "14").unwrap();
    response.set_body(br#"{"status":"a"}"#);

    c.bench_function("serialize_response", |b| b.iter(|| black_box(&response).message_data().unwrap()));
}

criterion_group!(benches, bench_parse_request, bench_serialize_response);
criterion_main!(benches);
