//! End-to-end flows through the node's event loop, against nullable
//! collaborators.

use std::sync::Arc;
use std::time::Duration;

use driplet_faucet::RewardController;
use driplet_node::{FaucetNode, InboundEvent, NodeConfig, OutboundReply, Shutdown};
use driplet_nullables::{NullClock, NullNetwork, NullSignIn};
use driplet_store::{AccountStore, MemoryStore};
use driplet_types::{LedgerAddress, Timestamp, UserId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

type TestNode = FaucetNode<MemoryStore, NullNetwork, NullClock, NullSignIn>;

struct Harness {
    node: Arc<TestNode>,
    events: mpsc::Sender<InboundEvent>,
    replies: mpsc::Receiver<OutboundReply>,
    shutdown: Shutdown,
}

fn addr(tail: char) -> LedgerAddress {
    LedgerAddress::parse(&format!("rDsEH84xWaJycg341gzfx2ZMW7KrnBsVs{tail}")).unwrap()
}

fn harness() -> Harness {
    let mut config = NodeConfig::default();
    config.faucet.require_subscription = false;
    config.signin_poll_secs = 1;
    config.signin_max_wait_secs = 10;
    harness_with(config, NullSignIn::new())
}

fn harness_with(config: NodeConfig, signin: NullSignIn) -> Harness {
    let controller = RewardController::with_rng(
        MemoryStore::new(),
        NullNetwork::new(),
        config.source_address.clone(),
        config.faucet.clone(),
        NullClock::new(Timestamp::new(1_700_000_000)),
        StdRng::seed_from_u64(11),
    )
    .unwrap();
    let (event_tx, event_rx) = mpsc::channel(16);
    let (reply_tx, reply_rx) = mpsc::channel(16);
    let node = Arc::new(FaucetNode::new(controller, signin, &config, reply_tx));
    let shutdown = Shutdown::new();

    tokio::spawn(node.clone().run(event_rx, shutdown.handle()));

    Harness {
        node,
        events: event_tx,
        replies: reply_rx,
        shutdown,
    }
}

async fn recv(harness: &mut Harness) -> OutboundReply {
    tokio::time::timeout(Duration::from_secs(5), harness.replies.recv())
        .await
        .expect("reply within deadline")
        .expect("reply channel open")
}

async fn onboard(harness: &mut Harness, id: u64, referrer: Option<u64>) -> UserId {
    let user = UserId::new(id);
    harness
        .events
        .send(InboundEvent::Started {
            user,
            referrer: referrer.map(UserId::new),
        })
        .await
        .unwrap();
    assert_eq!(recv(harness).await, OutboundReply::Welcome { user });

    // Register the address directly; the sign-in flow has its own test.
    harness
        .node
        .controller()
        .register_address(user, addr(char::from_digit(id as u32, 10).unwrap()))
        .unwrap();
    user
}

#[tokio::test]
async fn claim_flow_from_start_to_payout() {
    let mut harness = harness();
    let user = onboard(&mut harness, 1, None).await;

    harness
        .events
        .send(InboundEvent::ClaimRequested { user })
        .await
        .unwrap();
    let OutboundReply::ChallengePresented { prompt, .. } = recv(&mut harness).await else {
        panic!("expected a challenge");
    };

    let mut parts = prompt.question.split_whitespace();
    let a: u32 = parts.next().unwrap().parse().unwrap();
    let b: u32 = parts.nth(1).unwrap().parse().unwrap();

    harness
        .events
        .send(InboundEvent::ChallengeAnswered { user, answer: a + b })
        .await
        .unwrap();
    let OutboundReply::Paid { amount, .. } = recv(&mut harness).await else {
        panic!("expected a payout");
    };
    assert_eq!(amount.drops(), 100);

    // A second claim request lands on the cooldown, which carries the
    // account's running figures for the transport to render.
    harness
        .events
        .send(InboundEvent::ClaimRequested { user })
        .await
        .unwrap();
    let OutboundReply::Cooldown { remaining_secs, stats, .. } = recv(&mut harness).await else {
        panic!("expected a cooldown reply");
    };
    assert!(remaining_secs > 0);
    assert_eq!(stats.claims, 1);
    assert_eq!(stats.total_profit.drops(), 100);
    assert!(stats.referral_profit.is_zero());

    harness.shutdown.trigger();
}

#[tokio::test]
async fn stranger_is_not_authorized() {
    let mut harness = harness();
    harness
        .events
        .send(InboundEvent::ClaimRequested { user: UserId::new(9) })
        .await
        .unwrap();
    assert_eq!(
        recv(&mut harness).await,
        OutboundReply::NotAuthorized { user: UserId::new(9) }
    );
}

#[tokio::test]
async fn login_flow_registers_the_signed_address() {
    let mut config = NodeConfig::default();
    config.faucet.require_subscription = false;
    config.signin_poll_secs = 1;
    config.signin_max_wait_secs = 10;
    let signin = NullSignIn::new();
    signin.enqueue_signed(addr('a'));
    let mut harness = harness_with(config, signin);

    let user = UserId::new(3);
    harness
        .events
        .send(InboundEvent::Started { user, referrer: None })
        .await
        .unwrap();
    assert_eq!(recv(&mut harness).await, OutboundReply::Welcome { user });

    harness
        .events
        .send(InboundEvent::LoginRequested { user })
        .await
        .unwrap();
    assert!(matches!(
        recv(&mut harness).await,
        OutboundReply::LoginUrl { .. }
    ));
    assert_eq!(
        recv(&mut harness).await,
        OutboundReply::LoginCompleted { user, address: addr('a') }
    );

    let account = harness.node.controller().store().get(user).unwrap().unwrap();
    assert!(account.authorized);
    assert_eq!(account.address, Some(addr('a')));
}

#[tokio::test]
async fn inactive_wallet_is_reported_not_registered() {
    let mut config = NodeConfig::default();
    config.faucet.require_subscription = false;
    config.signin_poll_secs = 1;
    config.signin_max_wait_secs = 10;
    let signin = NullSignIn::new();
    signin.enqueue_signed(addr('a'));
    let mut harness = harness_with(config, signin);
    harness
        .node
        .controller()
        .network()
        .set_active_accounts(vec![addr('b')]);

    let user = UserId::new(3);
    harness
        .events
        .send(InboundEvent::Started { user, referrer: None })
        .await
        .unwrap();
    recv(&mut harness).await;

    harness
        .events
        .send(InboundEvent::LoginRequested { user })
        .await
        .unwrap();
    recv(&mut harness).await; // login url
    assert_eq!(
        recv(&mut harness).await,
        OutboundReply::WalletInactive { user, address: addr('a') }
    );

    let account = harness.node.controller().store().get(user).unwrap().unwrap();
    assert!(!account.authorized);
}

#[tokio::test]
async fn subscription_confirmation_unlocks_requests() {
    let mut config = NodeConfig::default();
    config.signin_poll_secs = 1;
    config.signin_max_wait_secs = 10;
    let mut harness = harness_with(config, NullSignIn::new());
    let user = onboard(&mut harness, 2, None).await;

    harness
        .events
        .send(InboundEvent::ClaimRequested { user })
        .await
        .unwrap();
    assert_eq!(recv(&mut harness).await, OutboundReply::NotSubscribed { user });

    harness
        .events
        .send(InboundEvent::SubscriptionConfirmed { user })
        .await
        .unwrap();
    assert_eq!(
        recv(&mut harness).await,
        OutboundReply::SubscriptionRecorded { user }
    );

    harness
        .events
        .send(InboundEvent::ClaimRequested { user })
        .await
        .unwrap();
    assert!(matches!(
        recv(&mut harness).await,
        OutboundReply::ChallengePresented { .. }
    ));
}

#[tokio::test]
async fn referral_info_reflects_linked_accounts() {
    let mut harness = harness();
    let referrer = onboard(&mut harness, 1, None).await;
    onboard(&mut harness, 2, Some(1)).await;

    harness
        .events
        .send(InboundEvent::ReferralInfoRequested { user: referrer })
        .await
        .unwrap();
    let OutboundReply::ReferralInfo { referral_count, referral_profit, .. } =
        recv(&mut harness).await
    else {
        panic!("expected referral info");
    };
    assert_eq!(referral_count, 1);
    assert!(referral_profit.is_zero());
}
