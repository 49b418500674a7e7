use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use wikirace::protocol::{ClientMessage, PlayerInfo, ServerMessage};
use wikirace::state::AppState;
use wikirace::types::GameState;
use wikirace::ws::handlers::{handle_disconnect, handle_message};

/// Register a fake connection and return the receiving end of its outbound
/// channel, the way the socket task would hold it.
async fn connect(state: &Arc<AppState>, conn_id: &str) -> UnboundedReceiver<ServerMessage> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    state.register_connection(&conn_id.to_string(), tx).await;
    rx
}

fn roster_ids(players: &[PlayerInfo]) -> Vec<&str> {
    players.iter().map(|p| p.id.as_str()).collect()
}

/// End-to-end integration test for a complete race: create, join with a
/// generated name, start, progress, two independent wins, return to lobby.
#[tokio::test]
async fn test_full_race_flow() {
    let state = Arc::new(AppState::new());
    let mut rx_a = connect(&state, "A").await;
    let mut rx_b = connect(&state, "B").await;

    // 1. Ann creates a room
    let create_result = handle_message(
        ClientMessage::CreateRoom {
            username: "Ann".to_string(),
        },
        &"A".to_string(),
        &state,
    )
    .await;

    let room_id = match create_result {
        Some(ServerMessage::RoomCreated { room_id, players }) => {
            assert_eq!(roster_ids(&players), vec!["A"]);
            assert_eq!(players[0].name, "Ann");
            room_id
        }
        other => panic!("Expected RoomCreated, got {:?}", other),
    };

    // 2. B joins with an empty username and gets a generated two-word name
    let join_result = handle_message(
        ClientMessage::JoinRoom {
            room_id: room_id.clone(),
            username: "".to_string(),
        },
        &"B".to_string(),
        &state,
    )
    .await;

    let generated_name = match join_result {
        Some(ServerMessage::RoomJoined { players, .. }) => {
            assert_eq!(roster_ids(&players), vec!["A", "B"]);
            assert_eq!(
                players[1].name.split(' ').count(),
                2,
                "empty username gets a generated two-word name"
            );
            players[1].name.clone()
        }
        other => panic!("Expected RoomJoined, got {:?}", other),
    };

    // Ann is told about the new roster; B already has it from the ack
    match rx_a.try_recv() {
        Ok(ServerMessage::PlayersUpdated { players }) => {
            assert_eq!(roster_ids(&players), vec!["A", "B"]);
        }
        other => panic!("Expected PlayersUpdated for Ann, got {:?}", other),
    }
    assert!(rx_b.try_recv().is_err());

    // 3. Start the race Dog -> Cat
    let start_result = handle_message(
        ClientMessage::StartGame {
            room_id: room_id.clone(),
            start: "Dog".to_string(),
            target: "Cat".to_string(),
        },
        &"A".to_string(),
        &state,
    )
    .await;
    assert!(start_result.is_none(), "start is broadcast, not replied");

    for rx in [&mut rx_a, &mut rx_b] {
        match rx.try_recv() {
            Ok(ServerMessage::GameStarted { start, target }) => {
                assert_eq!(start, "Dog");
                assert_eq!(target, "Cat");
            }
            other => panic!("Expected GameStarted, got {:?}", other),
        }
    }

    let room = state.get_room(&room_id).await.unwrap();
    assert_eq!(room.game_state, GameState::Playing);
    for player in room.player_states.values() {
        assert_eq!(player.clicks, 0);
        assert_eq!(player.current_article, "Dog");
        assert_eq!(player.history, vec!["Dog".to_string()]);
    }

    // 4. B reports progress; only Ann hears about it
    handle_message(
        ClientMessage::UpdateProgress {
            room_id: room_id.clone(),
            current_article: "Cat".to_string(),
            clicks: 1,
        },
        &"B".to_string(),
        &state,
    )
    .await;

    match rx_a.try_recv() {
        Ok(ServerMessage::OpponentProgress {
            player_id,
            name,
            current_article,
            clicks,
        }) => {
            assert_eq!(player_id, "B");
            assert_eq!(name, generated_name);
            assert_eq!(current_article, "Cat");
            assert_eq!(clicks, 1);
        }
        other => panic!("Expected OpponentProgress, got {:?}", other),
    }
    assert!(rx_b.try_recv().is_err(), "B must not receive its own echo");

    // 5. B wins; both hear it; the race does not end
    handle_message(
        ClientMessage::GameWin {
            room_id: room_id.clone(),
            path: vec!["Dog".to_string(), "Cat".to_string()],
        },
        &"B".to_string(),
        &state,
    )
    .await;

    for rx in [&mut rx_a, &mut rx_b] {
        match rx.try_recv() {
            Ok(ServerMessage::PlayerWon {
                winner_id, path, ..
            }) => {
                assert_eq!(winner_id, "B");
                assert_eq!(path, vec!["Dog".to_string(), "Cat".to_string()]);
            }
            other => panic!("Expected PlayerWon, got {:?}", other),
        }
    }
    assert_eq!(
        state.get_room(&room_id).await.unwrap().game_state,
        GameState::Playing,
        "first win must not end the race for others"
    );

    // 6. Ann also finishes and gets her own win announcement
    handle_message(
        ClientMessage::GameWin {
            room_id: room_id.clone(),
            path: vec!["Dog".to_string(), "Mammal".to_string(), "Cat".to_string()],
        },
        &"A".to_string(),
        &state,
    )
    .await;

    for rx in [&mut rx_a, &mut rx_b] {
        match rx.try_recv() {
            Ok(ServerMessage::PlayerWon { winner_id, .. }) => {
                assert_eq!(winner_id, "A");
            }
            other => panic!("Expected second PlayerWon, got {:?}", other),
        }
    }

    // 7. Return to lobby resets the room for another round
    handle_message(
        ClientMessage::ReturnToLobby {
            room_id: room_id.clone(),
        },
        &"A".to_string(),
        &state,
    )
    .await;

    for rx in [&mut rx_a, &mut rx_b] {
        assert!(matches!(
            rx.try_recv(),
            Ok(ServerMessage::ReturnedToLobby)
        ));
    }
    assert_eq!(
        state.get_room(&room_id).await.unwrap().game_state,
        GameState::Waiting
    );
}

/// Capacity: joins beyond 8 players fail with ROOM_FULL; the roster never
/// exceeds the cap.
#[tokio::test]
async fn test_room_capacity() {
    let state = Arc::new(AppState::new());
    let _rx = connect(&state, "p0").await;

    let (room_id, _) = state.create_room(&"p0".to_string(), "P0").await;
    for i in 1..8 {
        let _rx = connect(&state, &format!("p{i}")).await;
        let result = handle_message(
            ClientMessage::JoinRoom {
                room_id: room_id.clone(),
                username: format!("P{i}"),
            },
            &format!("p{i}"),
            &state,
        )
        .await;
        assert!(matches!(result, Some(ServerMessage::RoomJoined { .. })));
    }

    let _rx = connect(&state, "late").await;
    let result = handle_message(
        ClientMessage::JoinRoom {
            room_id: room_id.clone(),
            username: "Late".to_string(),
        },
        &"late".to_string(),
        &state,
    )
    .await;

    match result {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "ROOM_FULL"),
        other => panic!("Expected ROOM_FULL error, got {:?}", other),
    }
    assert_eq!(state.get_room(&room_id).await.unwrap().players.len(), 8);
}

/// Joining once the race started fails with ROOM_ALREADY_PLAYING.
#[tokio::test]
async fn test_join_after_start_rejected() {
    let state = Arc::new(AppState::new());
    let _rx_a = connect(&state, "a").await;
    let _rx_b = connect(&state, "b").await;
    let _rx_c = connect(&state, "c").await;

    let (room_id, _) = state.create_room(&"a".to_string(), "Ann").await;
    state
        .join_room(&room_id, &"b".to_string(), "Bob")
        .await
        .unwrap();
    state.start_game(&room_id, "Dog", "Cat").await.unwrap();

    let result = handle_message(
        ClientMessage::JoinRoom {
            room_id,
            username: "Cid".to_string(),
        },
        &"c".to_string(),
        &state,
    )
    .await;

    match result {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "ROOM_ALREADY_PLAYING"),
        other => panic!("Expected ROOM_ALREADY_PLAYING error, got {:?}", other),
    }
}

/// Rooms vanish with their last player; independent registries don't share
/// rooms.
#[tokio::test]
async fn test_room_lifecycle_and_registry_isolation() {
    let state = Arc::new(AppState::new());
    let _rx_a = connect(&state, "a").await;
    let _rx_b = connect(&state, "b").await;

    let (room_id, _) = state.create_room(&"a".to_string(), "Ann").await;
    state
        .join_room(&room_id, &"b".to_string(), "Bob")
        .await
        .unwrap();

    handle_disconnect(&"a".to_string(), &state).await;
    assert!(state.get_room(&room_id).await.is_ok());

    handle_disconnect(&"b".to_string(), &state).await;
    assert!(
        state.get_room(&room_id).await.is_err(),
        "room must be deleted with its last player"
    );

    // A second registry is fully independent.
    let other = Arc::new(AppState::new());
    let (other_room, _) = other.create_room(&"x".to_string(), "Xan").await;
    assert!(state.get_room(&other_room).await.is_err());
}

/// Starting a second round resets clicks and history for every member, no
/// matter what the previous round left behind.
#[tokio::test]
async fn test_round_reset_is_idempotent() {
    let state = Arc::new(AppState::new());
    let _rx_a = connect(&state, "a").await;
    let _rx_b = connect(&state, "b").await;

    let (room_id, _) = state.create_room(&"a".to_string(), "Ann").await;
    state
        .join_room(&room_id, &"b".to_string(), "Bob")
        .await
        .unwrap();

    state.start_game(&room_id, "Dog", "Cat").await.unwrap();
    state
        .record_progress(&room_id, &"b".to_string(), "Mammal", 4)
        .await
        .unwrap();
    state
        .return_to_lobby(&room_id, &"a".to_string())
        .await
        .unwrap();

    state.start_game(&room_id, "Fish", "Bird").await.unwrap();

    let room = state.get_room(&room_id).await.unwrap();
    for player in room.player_states.values() {
        assert_eq!(player.clicks, 0);
        assert_eq!(player.current_article, "Fish");
        assert_eq!(player.history, vec!["Fish".to_string()]);
    }
}
