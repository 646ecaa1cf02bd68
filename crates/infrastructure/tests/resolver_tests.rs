//! Resolver state-machine scenarios against a scripted exchange: no
//! sockets, every upstream interaction recorded and asserted.

use async_trait::async_trait;
use rootward_domain::{
    DnsClass, DnsError, DnsHeader, DnsPacket, DnsRecord, RecordPreamble, RecordType,
    ResolverConfig, ResponseCode,
};
use rootward_infrastructure::dns::resolver::{Exchange, RecursiveResolver};
use rootward_infrastructure::dns::root_hints::ROOT_SERVERS;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(IpAddr, &DnsPacket) -> Result<DnsPacket, DnsError> + Send + Sync>;

struct ScriptedExchange {
    log: Mutex<Vec<(IpAddr, String, RecordType)>>,
    responder: Responder,
}

impl ScriptedExchange {
    fn new(responder: Responder) -> Self {
        Self {
            log: Mutex::new(Vec::new()),
            responder,
        }
    }

    fn queries(&self) -> Vec<(IpAddr, String, RecordType)> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Exchange for ScriptedExchange {
    async fn exchange(&self, server: IpAddr, query: &DnsPacket) -> Result<DnsPacket, DnsError> {
        let question = &query.questions[0];
        self.log
            .lock()
            .unwrap()
            .push((server, question.name.clone(), question.qtype));
        (self.responder)(server, query)
    }
}

fn response(
    query: &DnsPacket,
    rcode: ResponseCode,
    answers: Vec<DnsRecord>,
    authorities: Vec<DnsRecord>,
    additionals: Vec<DnsRecord>,
) -> DnsPacket {
    let mut packet = DnsPacket {
        header: DnsHeader {
            id: query.header.id,
            response: true,
            recursion_desired: query.header.recursion_desired,
            rcode,
            ..Default::default()
        },
        questions: query.questions.clone(),
        answers,
        authorities,
        additionals,
    };
    packet.sync_counts();
    packet
}

fn a_record(name: &str, address: [u8; 4]) -> DnsRecord {
    DnsRecord::A {
        preamble: RecordPreamble::new(name, DnsClass::IN, 300),
        address: Ipv4Addr::from(address),
    }
}

fn cname_record(name: &str, target: &str) -> DnsRecord {
    DnsRecord::CNAME {
        preamble: RecordPreamble::new(name, DnsClass::IN, 300),
        target: target.to_string(),
    }
}

fn ns_record(zone: &str, host: &str) -> DnsRecord {
    DnsRecord::NS {
        preamble: RecordPreamble::new(zone, DnsClass::IN, 172800),
        host: host.to_string(),
    }
}

fn soa_record(zone: &str) -> DnsRecord {
    DnsRecord::SOA {
        preamble: RecordPreamble::new(zone, DnsClass::IN, 900),
        mname: format!("ns1.{}", zone),
        rname: format!("hostmaster.{}", zone),
        serial: 1,
        refresh: 7200,
        retry: 900,
        expire: 604800,
        minimum: 86400,
    }
}

fn resolver(exchange: &Arc<ScriptedExchange>) -> RecursiveResolver {
    RecursiveResolver::new(exchange.clone(), ResolverConfig::default().max_recursion_depth)
}

const START: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 41, 0, 4));

#[tokio::test]
async fn cname_chain_is_returned_in_traversal_order() {
    let exchange = Arc::new(ScriptedExchange::new(Box::new(|_, query| {
        let domain = query.questions[0].name.as_str();
        let answers = match domain {
            "foo.example" => vec![cname_record("foo.example", "bar.example")],
            "bar.example" => vec![a_record("bar.example", [1, 2, 3, 4])],
            other => panic!("unexpected query for {}", other),
        };
        Ok(response(query, ResponseCode::NoError, answers, vec![], vec![]))
    })));

    let records = resolver(&exchange)
        .resolve(START, "foo.example", RecordType::A, 0)
        .await
        .unwrap();

    assert_eq!(
        records,
        vec![
            cname_record("foo.example", "bar.example"),
            a_record("bar.example", [1, 2, 3, 4]),
        ]
    );

    // The chase stays on the server that handed out the CNAME.
    let queries = exchange.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].0, START);
    assert_eq!(queries[1].0, START);
    assert_eq!(queries[1].1, "bar.example");
    assert_eq!(queries[1].2, RecordType::A);
}

#[tokio::test]
async fn referral_moves_to_the_glued_nameserver() {
    let gtld: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 5, 6, 30));

    let exchange = Arc::new(ScriptedExchange::new(Box::new(move |server, query| {
        if server == gtld {
            Ok(response(
                query,
                ResponseCode::NoError,
                vec![a_record("www.example.com", [93, 184, 216, 34])],
                vec![],
                vec![],
            ))
        } else {
            Ok(response(
                query,
                ResponseCode::NoError,
                vec![],
                vec![ns_record("com", "a.gtld-servers.net")],
                vec![a_record("a.gtld-servers.net", [192, 5, 6, 30])],
            ))
        }
    })));

    let records = resolver(&exchange)
        .resolve(START, "www.example.com", RecordType::A, 0)
        .await
        .unwrap();

    assert_eq!(records, vec![a_record("www.example.com", [93, 184, 216, 34])]);

    let queries = exchange.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].0, gtld);
    // The original question follows the referral unchanged.
    assert_eq!(queries[1].1, "www.example.com");
    assert_eq!(queries[1].2, RecordType::A);
}

#[tokio::test]
async fn nxdomain_surfaces_the_authority_soa() {
    let exchange = Arc::new(ScriptedExchange::new(Box::new(|_, query| {
        Ok(response(
            query,
            ResponseCode::NameError,
            vec![],
            vec![soa_record("example.com")],
            vec![],
        ))
    })));

    let err = resolver(&exchange)
        .resolve(START, "missing.example.com", RecordType::A, 0)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DnsError::Upstream {
            code: ResponseCode::NameError,
            authority: vec![soa_record("example.com")],
        }
    );
}

#[tokio::test]
async fn other_rcodes_carry_no_authority() {
    let exchange = Arc::new(ScriptedExchange::new(Box::new(|_, query| {
        Ok(response(
            query,
            ResponseCode::Refused,
            vec![],
            vec![soa_record("example.com")],
            vec![],
        ))
    })));

    let err = resolver(&exchange)
        .resolve(START, "example.com", RecordType::A, 0)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DnsError::Upstream {
            code: ResponseCode::Refused,
            authority: vec![],
        }
    );
}

#[tokio::test]
async fn cname_loop_hits_the_depth_bound() {
    let exchange = Arc::new(ScriptedExchange::new(Box::new(|_, query| {
        let domain = query.questions[0].name.as_str();
        let target = if domain == "a.example" {
            "b.example"
        } else {
            "a.example"
        };
        Ok(response(
            query,
            ResponseCode::NoError,
            vec![cname_record(domain, target)],
            vec![],
            vec![],
        ))
    })));

    let err = resolver(&exchange)
        .resolve(START, "a.example", RecordType::A, 0)
        .await
        .unwrap_err();

    assert_eq!(err, DnsError::DepthExceeded);
    let max_depth = ResolverConfig::default().max_recursion_depth;
    assert_eq!(exchange.queries().len(), max_depth as usize);
}

#[tokio::test]
async fn glueless_referral_without_addresses_is_no_nameserver() {
    let exchange = Arc::new(ScriptedExchange::new(Box::new(|_, query| {
        let domain = query.questions[0].name.as_str();
        if domain == "www.example.com" {
            Ok(response(
                query,
                ResponseCode::NoError,
                vec![],
                vec![ns_record("example.com", "ns.offsite.net")],
                vec![],
            ))
        } else {
            // The glue lookup for ns.offsite.net gets refused.
            Ok(response(query, ResponseCode::Refused, vec![], vec![], vec![]))
        }
    })));

    let err = resolver(&exchange)
        .resolve(START, "www.example.com", RecordType::A, 0)
        .await
        .unwrap_err();

    assert_eq!(err, DnsError::NoNameserver);

    let queries = exchange.queries();
    assert_eq!(queries[1].1, "ns.offsite.net");
    assert_eq!(queries[1].2, RecordType::A);
}

#[tokio::test]
async fn glueless_referral_is_resolved_through_the_roots() {
    let offsite: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));

    let exchange = Arc::new(ScriptedExchange::new(Box::new(move |server, query| {
        let domain = query.questions[0].name.as_str();
        if server == offsite {
            Ok(response(
                query,
                ResponseCode::NoError,
                vec![a_record("www.example.com", [93, 184, 216, 34])],
                vec![],
                vec![],
            ))
        } else if domain == "ns.offsite.net" {
            Ok(response(
                query,
                ResponseCode::NoError,
                vec![a_record("ns.offsite.net", [203, 0, 113, 7])],
                vec![],
                vec![],
            ))
        } else {
            Ok(response(
                query,
                ResponseCode::NoError,
                vec![],
                vec![ns_record("example.com", "ns.offsite.net")],
                vec![],
            ))
        }
    })));

    let records = resolver(&exchange)
        .resolve(START, "www.example.com", RecordType::A, 0)
        .await
        .unwrap();

    assert_eq!(records, vec![a_record("www.example.com", [93, 184, 216, 34])]);

    let queries = exchange.queries();
    assert_eq!(queries.len(), 3);
    // Glue lookup went to a root server, then the query moved on to the
    // freshly resolved nameserver.
    assert!(ROOT_SERVERS
        .iter()
        .any(|root| IpAddr::V4(root.ipv4) == queries[1].0));
    assert_eq!(queries[1].1, "ns.offsite.net");
    assert_eq!(queries[2].0, offsite);
    assert_eq!(queries[2].1, "www.example.com");
}

#[tokio::test]
async fn empty_referral_falls_back_to_the_root_hints() {
    // Start from a non-root server so the fallback is observable.
    let start: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 53));

    let exchange = Arc::new(ScriptedExchange::new(Box::new(move |server, query| {
        if server == start {
            // Misconfigured upstream: no answer, no referral.
            Ok(response(query, ResponseCode::NoError, vec![], vec![], vec![]))
        } else {
            Ok(response(
                query,
                ResponseCode::NoError,
                vec![a_record("www.example.com", [93, 184, 216, 34])],
                vec![],
                vec![],
            ))
        }
    })));

    let records = resolver(&exchange)
        .resolve(start, "www.example.com", RecordType::A, 0)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    let queries = exchange.queries();
    assert_eq!(queries.len(), 2);
    assert!(ROOT_SERVERS
        .iter()
        .any(|root| IpAddr::V4(root.ipv4) == queries[1].0));
}

#[tokio::test]
async fn parallel_answer_records_are_returned_whole() {
    let exchange = Arc::new(ScriptedExchange::new(Box::new(|_, query| {
        Ok(response(
            query,
            ResponseCode::NoError,
            vec![
                a_record("example.com", [93, 184, 216, 34]),
                a_record("example.com", [93, 184, 216, 35]),
            ],
            vec![],
            vec![],
        ))
    })));

    let records = resolver(&exchange)
        .resolve(START, "example.com", RecordType::A, 0)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
}
