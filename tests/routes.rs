use leagues_terminal::route::Route;
use leagues_terminal::state::League;

fn league(id: &str, name: &str, sport: &str) -> League {
    League {
        id: id.to_string(),
        name: name.to_string(),
        sport: sport.to_string(),
        alternate_name: String::new(),
    }
}

#[test]
fn detail_route_carries_name_and_sport() {
    let route = Route::league_detail(&league("4328", "English Premier League", "Soccer"));
    let path = route.to_path();
    assert!(path.starts_with("/league/4328?"));
    assert_eq!(Route::parse(&path), route);
}

#[test]
fn reserved_characters_round_trip() {
    let cases = [
        ("1", "Rock & Roll / League", "Soccer & Futsal"),
        ("2", "100% Real?", "A=B#C"),
        ("3", "  spaced  out  ", "+plus+"),
        ("4", "Ligue 1 Uber Eats – Élite", "Fútbol"),
        ("5", "", ""),
    ];
    for (id, name, sport) in cases {
        let route = Route::league_detail(&league(id, name, sport));
        let parsed = Route::parse(&route.to_path());
        match parsed {
            Route::League {
                id: got_id,
                name: got_name,
                sport: got_sport,
            } => {
                assert_eq!(got_id, id);
                assert_eq!(got_name.as_deref(), Some(name));
                assert_eq!(got_sport.as_deref(), Some(sport));
            }
            other => panic!("expected league route, got {other:?}"),
        }
    }
}

#[test]
fn ids_with_reserved_characters_round_trip() {
    let route = Route::league_detail(&league("a/b?c", "X", "Y"));
    assert_eq!(Route::parse(&route.to_path()), route);
}

#[test]
fn parses_hand_written_browser_style_path() {
    let route = Route::parse("/league/4387?name=NBA%20%26%20Friends&sport=Basketball");
    assert_eq!(
        route,
        Route::League {
            id: "4387".to_string(),
            name: Some("NBA & Friends".to_string()),
            sport: Some("Basketball".to_string()),
        }
    );
}
