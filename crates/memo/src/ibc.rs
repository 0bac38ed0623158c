//! The IBC memo builder (spec §4.9): constructs PFM-forward JSON and wasm
//! `swap_and_action` JSON for the six execution cases that let a multi-step
//! plan execute atomically off a single signed transaction.
//!
//! Rules common to all cases (spec §4.9): every IBC transfer carries an
//! explicit `timeout_timestamp`; PFM intermediate receivers are the literal
//! string `"pfm"`; the receiver of the hop immediately preceding the wasm
//! contract is the contract address itself; every post-swap IBC transfer
//! carries a `recover_address` in the broker's bech32 prefix; `affiliates`
//! is always an empty list.

use crate::error::MemoError;
use serde_json::{json, Value};

pub const PFM_RETRIES: u32 = 2;
pub const PFM_TIMEOUT: &str = "10m";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15 * 60;

/// One hop of a PFM forward chain. The literal receiver `"pfm"` is used for
/// every intermediate hop; only the final hop carries a real address or a
/// wasm contract address.
#[derive(Debug, Clone)]
pub struct PfmHop {
    pub receiver: String,
    pub port_id: String,
    pub channel_id: String,
}

/// `timeout_timestamp` in nanoseconds, `request_unix_secs + 15 minutes`.
pub fn default_timeout_timestamp_ns(request_unix_secs: u64) -> u64 {
    (request_unix_secs + DEFAULT_TIMEOUT_SECS) * 1_000_000_000
}

/// Builds a nested PFM `forward` JSON value from `hops`, terminating either
/// on the last hop's plain receiver or, if `tail` is given, embedding it as
/// that hop's `next` (cases 5 and 6: PFM wrapping a wasm payload).
fn pfm_forward_value(hops: &[PfmHop], tail: Option<Value>) -> Result<Value, MemoError> {
    if hops.is_empty() {
        return Err(MemoError::EmptyHops);
    }

    fn build(hops: &[PfmHop], index: usize, tail: &Option<Value>) -> Value {
        let hop = &hops[index];
        let is_last = index == hops.len() - 1;

        let mut forward = json!({
            "receiver": hop.receiver,
            "port": hop.port_id,
            "channel": hop.channel_id,
            "retries": PFM_RETRIES,
            "timeout": PFM_TIMEOUT,
        });

        if is_last {
            if let Some(tail) = tail {
                forward["next"] = tail.clone();
            }
        } else {
            forward["next"] = build(hops, index + 1, tail);
        }

        json!({ "forward": forward })
    }

    Ok(build(hops, 0, &tail))
}

/// Case 1: plain PFM forward. Used for an Indirect plan where every
/// intermediate chain has PFM.
pub fn build_pfm_forward(hops: &[PfmHop]) -> Result<String, MemoError> {
    Ok(pfm_forward_value(hops, None)?.to_string())
}

/// The action taken once the swap lands funds on the broker chain.
pub enum PostSwapAction {
    /// Case 2: funds stay on the broker chain.
    Transfer { to_address: String },
    /// Case 3 / 4: funds continue onward over IBC. `memo` carries a nested
    /// PFM forward (case 4) for destinations more than one hop from the
    /// broker, or is `None` for a single outbound hop (case 3).
    IbcTransfer {
        channel_id: String,
        port_id: String,
        receiver: String,
        recover_address: String,
        memo: Option<Value>,
    },
}

fn post_swap_action_value(action: &PostSwapAction) -> Value {
    match action {
        PostSwapAction::Transfer { to_address } => json!({
            "transfer": { "to_address": to_address }
        }),
        PostSwapAction::IbcTransfer {
            channel_id,
            port_id,
            receiver,
            recover_address,
            memo,
        } => {
            let mut ibc_info = json!({
                "source_channel": channel_id,
                "port": port_id,
                "receiver": receiver,
                "recover_address": recover_address,
            });
            if let Some(memo) = memo {
                ibc_info["memo"] = memo.clone();
            }
            json!({ "ibc_transfer": { "ibc_info": ibc_info } })
        }
    }
}

/// Builds the `wasm` memo object (`swap_and_action`) shared by cases 2-6.
fn wasm_swap_and_action_value(
    contract: &str,
    operations: &[crate::SwapOperationJson],
    min_asset_denom: &str,
    min_asset_amount: &str,
    post_action: &PostSwapAction,
) -> Result<Value, MemoError> {
    if operations.is_empty() {
        return Err(MemoError::EmptySwapOperations);
    }
    let ops: Vec<Value> = operations
        .iter()
        .map(|op| json!({ "pool": op.pool_id, "denom_in": op.denom_in, "denom_out": op.denom_out }))
        .collect();

    Ok(json!({
        "wasm": {
            "contract": contract,
            "msg": {
                "swap_and_action": {
                    "user_swap": { "swap_exact_asset_in": { "operations": ops } },
                    "min_asset": { "native": { "denom": min_asset_denom, "amount": min_asset_amount } },
                    "post_swap_action": post_swap_action_value(post_action),
                    "affiliates": [],
                }
            }
        }
    }))
}

/// Cases 2 and 3: wasm `swap_and_action` with either a `transfer` or a
/// single-hop `ibc_transfer` post-action.
pub fn build_wasm_swap_and_action(
    contract: &str,
    operations: &[crate::SwapOperationJson],
    min_asset_denom: &str,
    min_asset_amount: &str,
    post_action: PostSwapAction,
) -> Result<String, MemoError> {
    Ok(wasm_swap_and_action_value(contract, operations, min_asset_denom, min_asset_amount, &post_action)?.to_string())
}

/// Case 4: wasm `swap_and_action` whose `ibc_transfer` post-action's memo
/// embeds a nested PFM forward for the remaining outbound hops.
pub fn build_wasm_swap_and_action_with_nested_pfm(
    contract: &str,
    operations: &[crate::SwapOperationJson],
    min_asset_denom: &str,
    min_asset_amount: &str,
    first_hop_channel_id: &str,
    first_hop_port_id: &str,
    recover_address: &str,
    outbound_hops: &[PfmHop],
) -> Result<String, MemoError> {
    let nested_pfm = pfm_forward_value(outbound_hops, None)?;
    let post_action = PostSwapAction::IbcTransfer {
        channel_id: first_hop_channel_id.to_string(),
        port_id: first_hop_port_id.to_string(),
        receiver: "pfm".to_string(),
        recover_address: recover_address.to_string(),
        memo: Some(nested_pfm),
    };
    build_wasm_swap_and_action(contract, operations, min_asset_denom, min_asset_amount, post_action)
}

/// Case 5: PFM forward whose final hop's `next` wraps a wasm
/// `swap_and_action` whose result stays on the broker chain.
pub fn build_pfm_wrapping_wasm(
    inbound_hops: &[PfmHop],
    contract: &str,
    operations: &[crate::SwapOperationJson],
    min_asset_denom: &str,
    min_asset_amount: &str,
    final_receiver: &str,
) -> Result<String, MemoError> {
    let wasm = wasm_swap_and_action_value(
        contract,
        operations,
        min_asset_denom,
        min_asset_amount,
        &PostSwapAction::Transfer { to_address: final_receiver.to_string() },
    )?;
    Ok(pfm_forward_value(inbound_hops, Some(wasm))?.to_string())
}

/// Case 6: PFM forward whose `next` wraps a wasm `swap_and_action` whose own
/// post-action itself forwards via a nested PFM memo.
pub fn build_pfm_wrapping_wasm_wrapping_pfm(
    inbound_hops: &[PfmHop],
    contract: &str,
    operations: &[crate::SwapOperationJson],
    min_asset_denom: &str,
    min_asset_amount: &str,
    first_outbound_channel_id: &str,
    first_outbound_port_id: &str,
    recover_address: &str,
    outbound_hops: &[PfmHop],
) -> Result<String, MemoError> {
    let nested_pfm = pfm_forward_value(outbound_hops, None)?;
    let post_action = PostSwapAction::IbcTransfer {
        channel_id: first_outbound_channel_id.to_string(),
        port_id: first_outbound_port_id.to_string(),
        receiver: "pfm".to_string(),
        recover_address: recover_address.to_string(),
        memo: Some(nested_pfm),
    };
    let wasm = wasm_swap_and_action_value(contract, operations, min_asset_denom, min_asset_amount, &post_action)?;
    Ok(pfm_forward_value(inbound_hops, Some(wasm))?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SwapOperationJson;

    fn hop(receiver: &str, channel: &str) -> PfmHop {
        PfmHop { receiver: receiver.to_string(), port_id: "transfer".to_string(), channel_id: channel.to_string() }
    }

    fn ops() -> Vec<SwapOperationJson> {
        vec![SwapOperationJson { pool_id: "1".to_string(), denom_in: "uosmo".to_string(), denom_out: "uatom".to_string() }]
    }

    #[test]
    fn case1_intermediate_receivers_are_literal_pfm() {
        let memo = build_pfm_forward(&[hop("pfm", "channel-0"), hop("juno1receiver", "channel-5")]).unwrap();
        let parsed: Value = serde_json::from_str(&memo).unwrap();
        assert_eq!(parsed["forward"]["receiver"], "pfm");
        assert_eq!(parsed["forward"]["next"]["forward"]["receiver"], "juno1receiver");
    }

    #[test]
    fn case2_transfer_post_action() {
        let memo = build_wasm_swap_and_action(
            "osmo1contract",
            &ops(),
            "uatom",
            "950000",
            PostSwapAction::Transfer { to_address: "osmo1receiver".to_string() },
        )
        .unwrap();
        let parsed: Value = serde_json::from_str(&memo).unwrap();
        assert_eq!(parsed["wasm"]["contract"], "osmo1contract");
        assert_eq!(
            parsed["wasm"]["msg"]["swap_and_action"]["post_swap_action"]["transfer"]["to_address"],
            "osmo1receiver"
        );
        assert_eq!(parsed["wasm"]["msg"]["swap_and_action"]["min_asset"]["native"]["amount"], "950000");
        assert_eq!(parsed["wasm"]["msg"]["swap_and_action"]["affiliates"], json!([]));
    }

    #[test]
    fn case3_single_outbound_hop() {
        let memo = build_wasm_swap_and_action(
            "osmo1contract",
            &ops(),
            "uatom",
            "950000",
            PostSwapAction::IbcTransfer {
                channel_id: "channel-0".to_string(),
                port_id: "transfer".to_string(),
                receiver: "juno1receiver".to_string(),
                recover_address: "osmo1recover".to_string(),
                memo: None,
            },
        )
        .unwrap();
        let parsed: Value = serde_json::from_str(&memo).unwrap();
        let ibc_info = &parsed["wasm"]["msg"]["swap_and_action"]["post_swap_action"]["ibc_transfer"]["ibc_info"];
        assert_eq!(ibc_info["receiver"], "juno1receiver");
        assert_eq!(ibc_info["recover_address"], "osmo1recover");
        assert!(ibc_info.get("memo").is_none());
    }

    #[test]
    fn case4_nested_pfm_in_wasm_ibc_transfer() {
        let memo = build_wasm_swap_and_action_with_nested_pfm(
            "osmo1contract",
            &ops(),
            "uatom",
            "950000",
            "channel-0",
            "transfer",
            "osmo1recover",
            &[hop("pfm", "channel-1"), hop("stars1final", "channel-2")],
        )
        .unwrap();
        let parsed: Value = serde_json::from_str(&memo).unwrap();
        let ibc_info = &parsed["wasm"]["msg"]["swap_and_action"]["post_swap_action"]["ibc_transfer"]["ibc_info"];
        assert_eq!(ibc_info["receiver"], "pfm");
        assert_eq!(ibc_info["memo"]["forward"]["receiver"], "pfm");
        assert_eq!(ibc_info["memo"]["forward"]["next"]["forward"]["receiver"], "stars1final");
    }

    #[test]
    fn case5_pfm_wrapping_wasm() {
        let memo = build_pfm_wrapping_wasm(
            &[hop("pfm", "channel-1")],
            "osmo1contract",
            &ops(),
            "uatom",
            "950000",
            "osmo1receiver",
        )
        .unwrap();
        let parsed: Value = serde_json::from_str(&memo).unwrap();
        assert_eq!(parsed["forward"]["receiver"], "pfm");
        assert_eq!(parsed["forward"]["next"]["wasm"]["contract"], "osmo1contract");
    }

    #[test]
    fn case6_both_nested() {
        let memo = build_pfm_wrapping_wasm_wrapping_pfm(
            &[hop("pfm", "channel-1")],
            "osmo1contract",
            &ops(),
            "uatom",
            "950000",
            "channel-0",
            "transfer",
            "osmo1recover",
            &[hop("pfm", "channel-2"), hop("stars1final", "channel-3")],
        )
        .unwrap();
        let parsed: Value = serde_json::from_str(&memo).unwrap();
        assert_eq!(parsed["forward"]["receiver"], "pfm");
        let wasm = &parsed["forward"]["next"]["wasm"];
        assert_eq!(wasm["contract"], "osmo1contract");
        let nested = &wasm["msg"]["swap_and_action"]["post_swap_action"]["ibc_transfer"]["ibc_info"]["memo"];
        assert_eq!(nested["forward"]["next"]["forward"]["receiver"], "stars1final");
    }

    #[test]
    fn empty_hops_rejected() {
        assert!(build_pfm_forward(&[]).is_err());
    }

    #[test]
    fn empty_operations_rejected() {
        assert!(build_wasm_swap_and_action(
            "osmo1contract",
            &[],
            "uatom",
            "1",
            PostSwapAction::Transfer { to_address: "osmo1receiver".to_string() }
        )
        .is_err());
    }
}
