//! The 13 IANA root name servers, compiled into the binary. This table
//! is the only state shared between concurrent queries and it never
//! changes for the lifetime of the process.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

pub struct RootServer {
    pub letter: char,
    pub ipv4: Ipv4Addr,
    pub ipv6: Ipv6Addr,
}

pub const ROOT_SERVERS: [RootServer; 13] = [
    RootServer {
        letter: 'A',
        ipv4: Ipv4Addr::new(198, 41, 0, 4),
        ipv6: Ipv6Addr::new(0x2001, 0x503, 0xba3e, 0, 0, 0, 0x2, 0x30),
    },
    RootServer {
        letter: 'B',
        ipv4: Ipv4Addr::new(199, 9, 14, 201),
        ipv6: Ipv6Addr::new(0x2801, 0x1b8, 0x10, 0, 0, 0, 0, 0xb),
    },
    RootServer {
        letter: 'C',
        ipv4: Ipv4Addr::new(192, 33, 4, 12),
        ipv6: Ipv6Addr::new(0x2001, 0x500, 0x2, 0, 0, 0, 0, 0xc),
    },
    RootServer {
        letter: 'D',
        ipv4: Ipv4Addr::new(199, 7, 91, 13),
        ipv6: Ipv6Addr::new(0x2001, 0x500, 0x2d, 0, 0, 0, 0, 0xd),
    },
    RootServer {
        letter: 'E',
        ipv4: Ipv4Addr::new(192, 203, 230, 10),
        ipv6: Ipv6Addr::new(0x2001, 0x500, 0xa8, 0, 0, 0, 0, 0xe),
    },
    RootServer {
        letter: 'F',
        ipv4: Ipv4Addr::new(192, 5, 5, 241),
        ipv6: Ipv6Addr::new(0x2001, 0x500, 0x2f, 0, 0, 0, 0, 0xf),
    },
    RootServer {
        letter: 'G',
        ipv4: Ipv4Addr::new(192, 112, 36, 4),
        ipv6: Ipv6Addr::new(0x2001, 0x500, 0x12, 0, 0, 0, 0, 0xd0d),
    },
    RootServer {
        letter: 'H',
        ipv4: Ipv4Addr::new(198, 97, 190, 53),
        ipv6: Ipv6Addr::new(0x2001, 0x500, 0x1, 0, 0, 0, 0, 0x53),
    },
    RootServer {
        letter: 'I',
        ipv4: Ipv4Addr::new(192, 36, 148, 17),
        ipv6: Ipv6Addr::new(0x2001, 0x7fe, 0, 0, 0, 0, 0, 0x53),
    },
    RootServer {
        letter: 'J',
        ipv4: Ipv4Addr::new(192, 58, 128, 30),
        ipv6: Ipv6Addr::new(0x2001, 0x503, 0xc27, 0, 0, 0, 0x2, 0x30),
    },
    RootServer {
        letter: 'K',
        ipv4: Ipv4Addr::new(193, 0, 14, 129),
        ipv6: Ipv6Addr::new(0x2001, 0x7fd, 0, 0, 0, 0, 0, 0x1),
    },
    RootServer {
        letter: 'L',
        ipv4: Ipv4Addr::new(199, 7, 83, 42),
        ipv6: Ipv6Addr::new(0x2001, 0x500, 0x9f, 0, 0, 0, 0, 0x42),
    },
    RootServer {
        letter: 'M',
        ipv4: Ipv4Addr::new(202, 12, 27, 33),
        ipv6: Ipv6Addr::new(0x2001, 0xdc3, 0, 0, 0, 0, 0, 0x35),
    },
];

/// Picks a root server uniformly at random, preferring its IPv4 address
/// so cold resolution works on v4-only hosts.
pub fn random_root_server() -> IpAddr {
    let server = &ROOT_SERVERS[fastrand::usize(..ROOT_SERVERS.len())];
    IpAddr::V4(server.ipv4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirteen_letters_a_through_m() {
        assert_eq!(ROOT_SERVERS.len(), 13);
        for (i, server) in ROOT_SERVERS.iter().enumerate() {
            assert_eq!(server.letter, (b'A' + i as u8) as char);
        }
    }

    #[test]
    fn well_known_entries_match_iana() {
        assert_eq!(ROOT_SERVERS[0].ipv4, Ipv4Addr::new(198, 41, 0, 4));
        assert_eq!(
            ROOT_SERVERS[0].ipv6,
            "2001:503:ba3e::2:30".parse::<Ipv6Addr>().unwrap()
        );
        assert_eq!(ROOT_SERVERS[12].ipv4, Ipv4Addr::new(202, 12, 27, 33));
        assert_eq!(
            ROOT_SERVERS[12].ipv6,
            "2001:dc3::35".parse::<Ipv6Addr>().unwrap()
        );
    }

    #[test]
    fn random_pick_is_a_table_member() {
        for _ in 0..50 {
            let ip = random_root_server();
            assert!(ROOT_SERVERS.iter().any(|s| IpAddr::V4(s.ipv4) == ip));
        }
    }
}
