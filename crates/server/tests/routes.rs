use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use futures_util::{future::BoxFuture, FutureExt};
use loyalty_sdk::{
    rpc::{das::AssetOwnership, Asset},
    solana_sdk::pubkey::Pubkey,
    AssetIndex, LeaderboardOptions, LoyaltyProtocol, Network, Operation, PassData,
    ProgramDetails, RewardTier,
};
use loyalty_server::{app, AppState};
use poem::{
    http::{header, StatusCode},
    test::{TestClient, TestResponse},
};
use serde_json::{json, Value};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Default)]
struct FakeIndex {
    collections: HashMap<String, Vec<Asset>>,
}

impl AssetIndex for FakeIndex {
    fn collection_assets<'a>(
        &'a self,
        _network: Network,
        collection: &'a str,
    ) -> BoxFuture<'a, loyalty_sdk::Result<Vec<Asset>>> {
        async move {
            self.collections.get(collection).cloned().ok_or_else(|| {
                loyalty_sdk::Error::Rpc(loyalty_sdk::rpc::Error::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            })
        }
        .boxed()
    }
}

#[derive(Default)]
struct FakeProtocol {
    programs: HashMap<String, ProgramDetails>,
    passes: HashMap<String, PassData>,
    failing: HashSet<String>,
    signer: bool,
    invocations: Mutex<Vec<(Network, Operation, Value)>>,
}

impl FakeProtocol {
    fn unavailable(&self, address: &str) -> loyalty_sdk::Result<()> {
        if self.failing.contains(address) {
            return Err(loyalty_sdk::Error::Bridge {
                status: 502,
                message: "bridge unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl LoyaltyProtocol for FakeProtocol {
    fn get_asset_data<'a>(
        &'a self,
        _network: Network,
        pass: &'a str,
    ) -> BoxFuture<'a, loyalty_sdk::Result<Option<PassData>>> {
        async move {
            self.unavailable(pass)?;
            Ok(self.passes.get(pass).cloned())
        }
        .boxed()
    }

    fn get_program_details<'a>(
        &'a self,
        _network: Network,
        collection: &'a str,
    ) -> BoxFuture<'a, loyalty_sdk::Result<Option<ProgramDetails>>> {
        async move {
            self.unavailable(collection)?;
            Ok(self.programs.get(collection).cloned())
        }
        .boxed()
    }

    fn invoke<'a>(
        &'a self,
        network: Network,
        operation: Operation,
        params: Value,
    ) -> BoxFuture<'a, loyalty_sdk::Result<Value>> {
        async move {
            if !self.signer {
                return Err(loyalty_sdk::Error::MissingSecretKey);
            }
            self.invocations
                .lock()
                .unwrap()
                .push((network, operation, params.clone()));
            Ok(json!({ "signature": "5xSig", "echo": params }))
        }
        .boxed()
    }
}

struct Fixture {
    program: String,
    empty_program: String,
    broken_program: String,
    pass: String,
    unavailable: String,
    protocol: Arc<FakeProtocol>,
    client: TestClient<poem::endpoint::BoxEndpoint<'static>>,
}

fn asset(id: &str, owner: &str) -> Asset {
    Asset {
        id: id.to_string(),
        ownership: AssetOwnership {
            owner: owner.to_string(),
        },
    }
}

fn pass(xp: u64) -> PassData {
    PassData {
        xp,
        current_tier: "Grind".to_string(),
        ..Default::default()
    }
}

fn details(name: &str) -> ProgramDetails {
    ProgramDetails {
        name: name.to_string(),
        reward_tiers: vec![
            RewardTier::new("Bronze", 0),
            RewardTier::new("Silver", 500),
            RewardTier::new("Gold", 1000),
        ],
        ..Default::default()
    }
}

fn fixture(signer: bool) -> Fixture {
    let program = Pubkey::new_unique().to_string();
    let empty_program = Pubkey::new_unique().to_string();
    let broken_program = Pubkey::new_unique().to_string();
    let pass_address = Pubkey::new_unique().to_string();
    let unavailable = Pubkey::new_unique().to_string();

    let index = FakeIndex {
        collections: HashMap::from([
            (
                program.clone(),
                vec![
                    asset(&pass_address, "alice"),
                    asset("p2", "bob"),
                    asset("p3", "alice"),
                ],
            ),
            (empty_program.clone(), vec![]),
        ]),
    };
    let protocol = Arc::new(FakeProtocol {
        programs: HashMap::from([
            (program.clone(), details("Coffee Club")),
            (empty_program.clone(), details("Fresh Start")),
            (broken_program.clone(), details("Broken")),
        ]),
        passes: HashMap::from([
            (pass_address.clone(), pass(400)),
            ("p2".to_string(), pass(1200)),
            ("p3".to_string(), pass(350)),
        ]),
        failing: HashSet::from([unavailable.clone()]),
        signer,
        invocations: Mutex::new(Vec::new()),
    });

    let state = AppState::new(
        Arc::new(index),
        protocol.clone(),
        LeaderboardOptions::default(),
    );
    let client = TestClient::new(poem::EndpointExt::boxed(app(state)));

    Fixture {
        program,
        empty_program,
        broken_program,
        pass: pass_address,
        unavailable,
        protocol,
        client,
    }
}

async fn json_body(resp: TestResponse) -> Value {
    resp.0
        .into_body()
        .into_json::<Value>()
        .await
        .expect("json body")
}

#[tokio::test]
async fn leaderboard_ranks_members() {
    let fx = fixture(true);

    let resp = fx
        .client
        .get(format!("/api/leaderboard/{}?network=devnet", fx.program))
        .send()
        .await;

    assert_eq!(resp.0.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let data = &body["data"];
    assert_eq!(data["programName"], "Coffee Club");
    assert_eq!(data["totalMinted"], 3);
    assert_eq!(data["totalMembers"], 2);
    assert_eq!(data["network"], "devnet");
    let members = data["members"].as_array().unwrap();
    assert_eq!(members[0]["address"], "bob");
    assert_eq!(members[0]["rank"], 1);
    assert_eq!(members[0]["currentTier"], "Gold");
    assert_eq!(members[0]["currentLevel"], "3");
    assert_eq!(members[1]["address"], "alice");
    assert_eq!(members[1]["totalXp"], 750);
    assert_eq!(members[1]["assetAddress"], fx.pass.as_str());
    assert_eq!(members[1]["currentTier"], "Silver");
    assert_eq!(members[1]["level"], 2);
    assert_eq!(members[1]["rank"], 2);
}

#[tokio::test]
async fn leaderboard_is_served_from_a_spawned_task() {
    let fx = fixture(true);
    let uri = format!("/api/leaderboard/{}?network=devnet", fx.program);

    let status = tokio::spawn(async move { fx.client.get(uri).send().await.0.status() })
        .await
        .expect("request task");

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn leaderboard_requires_network() {
    let fx = fixture(true);

    let resp = fx
        .client
        .get(format!("/api/leaderboard/{}", fx.program))
        .send()
        .await;

    assert_eq!(resp.0.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "NETWORK_REQUIRED");

    let resp = fx
        .client
        .get(format!("/api/leaderboard/{}?network=testnet", fx.program))
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["code"], "INVALID_NETWORK");
}

#[tokio::test]
async fn leaderboard_error_codes() {
    let fx = fixture(true);

    let unknown = Pubkey::new_unique();
    let resp = fx
        .client
        .get(format!("/api/leaderboard/{unknown}?network=devnet"))
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["code"], "LEADERBOARD_NOT_FOUND");

    let resp = fx
        .client
        .get(format!("/api/leaderboard/{}?network=devnet", fx.broken_program))
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "LEADERBOARD_ERROR");
    assert_eq!(body["error"], "Failed to fetch leaderboard");

    let resp = fx
        .client
        .get("/api/leaderboard/not-a-key?network=devnet")
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_leaderboard() {
    let fx = fixture(true);

    let resp = fx
        .client
        .get(format!(
            "/api/leaderboard/{}?network=mainnet-beta",
            fx.empty_program
        ))
        .send()
        .await;

    assert_eq!(resp.0.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["data"]["totalMinted"], 0);
    assert_eq!(body["data"]["totalMembers"], 0);
    assert_eq!(body["data"]["members"], json!([]));
}

#[tokio::test]
async fn leaderboard_image_is_an_uncached_png() {
    let fx = fixture(true);

    let resp = fx
        .client
        .get(format!(
            "/api/leaderboard/{}/image?network=devnet&headerImage=ftp%3A%2F%2Fcdn.test%2Fh.png",
            fx.program
        ))
        .send()
        .await;

    assert_eq!(resp.0.status(), StatusCode::OK);
    let headers = resp.0.headers().clone();
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    let png = resp.0.into_body().into_vec().await.unwrap();
    assert!(png.starts_with(PNG_MAGIC));
}

#[tokio::test]
async fn pass_and_program_reads() {
    let fx = fixture(true);

    let resp = fx
        .client
        .get(format!("/api/pass/{}?network=devnet", fx.pass))
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["data"]["xp"], 400);

    let missing = Pubkey::new_unique();
    let resp = fx
        .client
        .get(format!("/api/pass/{missing}?network=devnet"))
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["code"], "PASS_NOT_FOUND");

    let resp = fx
        .client
        .get(format!("/api/program/{}?network=devnet", fx.program))
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["data"]["name"], "Coffee Club");
    assert_eq!(body["data"]["rewardTiers"][1]["xpRequired"], 500);

    let resp = fx
        .client
        .get(format!("/api/program/{missing}/image?network=devnet"))
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["code"], "PROGRAM_NOT_FOUND");

    let resp = fx
        .client
        .get(format!("/api/pass/{}/image?network=devnet", fx.pass))
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::OK);
    assert_eq!(resp.0.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(resp.0.headers()[header::CONTENT_TYPE], "image/png");
    let png = resp.0.into_body().into_vec().await.unwrap();
    assert!(png.starts_with(PNG_MAGIC));
}

#[tokio::test]
async fn pass_and_program_reject_invalid_addresses() {
    let fx = fixture(true);

    for path in [
        "/api/pass/not-a-key?network=devnet",
        "/api/pass/not-a-key/image?network=devnet",
        "/api/program/not-a-key?network=devnet",
        "/api/program/not-a-key/image?network=devnet",
    ] {
        let resp = fx.client.get(path).send().await;
        assert_eq!(resp.0.status(), StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(json_body(resp).await["code"], "INVALID_ADDRESS", "{path}");
    }
}

#[tokio::test]
async fn bridge_failures_are_internal_errors() {
    let fx = fixture(true);

    let resp = fx
        .client
        .get(format!("/api/pass/{}?network=devnet", fx.unavailable))
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(resp).await["code"], "PASS_ERROR");

    let resp = fx
        .client
        .get(format!("/api/program/{}?network=devnet", fx.unavailable))
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(resp).await["code"], "PROGRAM_ERROR");

    let resp = fx
        .client
        .get(format!("/api/program/{}/image?network=devnet", fx.unavailable))
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(resp).await["code"], "PROGRAM_ERROR");
}

#[tokio::test]
async fn operations_are_forwarded() {
    let fx = fixture(true);

    let resp = fx
        .client
        .post("/api/award-loyalty-points")
        .content_type("application/json")
        .body(r#"{"passAddress":"abc","action":"purchase","network":"mainnet-beta"}"#)
        .send()
        .await;

    assert_eq!(resp.0.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["operation"], "award-loyalty-points");
    assert_eq!(body["network"], "mainnet-beta");
    assert_eq!(body["result"]["signature"], "5xSig");

    let invocations = fx.protocol.invocations.lock().unwrap().clone();
    assert_eq!(
        invocations,
        [(
            Network::MainnetBeta,
            Operation::AwardLoyaltyPoints,
            json!({ "passAddress": "abc", "action": "purchase" })
        )]
    );
}

#[tokio::test]
async fn operation_errors() {
    let fx = fixture(true);

    let resp = fx
        .client
        .post("/api/transfer-everything")
        .body("{}")
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::NOT_FOUND);

    let resp = fx.client.post("/api/mint-voucher").body("{oops").send().await;
    assert_eq!(resp.0.status(), StatusCode::BAD_REQUEST);

    let fx = fixture(false);
    let resp = fx
        .client
        .post("/api/mint-voucher")
        .body(r#"{"collectionAddress":"abc"}"#)
        .send()
        .await;
    assert_eq!(resp.0.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(resp).await["error"], "SECRET_KEY is not configured");
}

#[tokio::test]
async fn health() {
    let fx = fixture(false);
    let resp = fx.client.get("/health").send().await;
    assert_eq!(resp.0.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "ok");
}
