use sv::messages::Tx;
use crate::models::TokenInfo;

const OP_RETURN: u8 = 0x6a;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;

// Protocol identifier pushed right after OP_RETURN ("SLP\0")
const SLP_LOKAD_ID: &[u8] = b"SLP\x00";

// Returns the first output's script if it is an OP_RETURN script
pub fn extract_op_return(tx: &Tx) -> Option<&[u8]> {
    // SLP only recognises an envelope in output 0
    let out = tx.outputs.first()?;
    let script = out.lock_script.0.as_slice();
    if !script.is_empty() && script[0] == OP_RETURN {
        Some(script)
    } else {
        None
    }
}

// Reads token info from a decoded transaction; None for anything that is not an SLP envelope
pub fn slp_token_info(tx: &Tx, txid: &str) -> Option<TokenInfo> {
    extract_op_return(tx).and_then(|script| parse_slp_script(script, txid))
}

// Parses an OP_RETURN script far enough to find the token id. No amounts or DAG checks.
pub fn parse_slp_script(script: &[u8], txid: &str) -> Option<TokenInfo> {
    if script.first() != Some(&OP_RETURN) {
        return None;
    }
    let pushes = read_pushes(&script[1..])?;
    if pushes.len() < 3 || pushes[0] != SLP_LOKAD_ID {
        return None;
    }

    // Token type is a 1 or 2 byte big-endian integer
    let token_type = match pushes[1] {
        [t] => *t as u16,
        [hi, lo] => u16::from_be_bytes([*hi, *lo]),
        _ => return None,
    };

    let tx_type = std::str::from_utf8(pushes[2]).ok()?;
    let token_id = match tx_type {
        // A genesis transaction creates the token, so its own txid is the token id
        "GENESIS" => txid.to_string(),
        "MINT" | "SEND" => {
            let id = pushes.get(3)?;
            if id.len() != 32 {
                return None;
            }
            hex::encode(id)
        }
        _ => return None,
    };

    Some(TokenInfo {
        token_id,
        token_type,
        tx_type: tx_type.to_string(),
    })
}

// Splits a script body into its data pushes; None if it contains anything but pushes
fn read_pushes(mut body: &[u8]) -> Option<Vec<&[u8]>> {
    let mut pushes = Vec::new();
    while let Some((&opcode, rest)) = body.split_first() {
        let (len, rest) = match opcode {
            0x00 => (0, rest),
            0x01..=0x4b => (opcode as usize, rest),
            OP_PUSHDATA1 => {
                let (&n, rest) = rest.split_first()?;
                (n as usize, rest)
            }
            OP_PUSHDATA2 => {
                if rest.len() < 2 {
                    return None;
                }
                (u16::from_le_bytes([rest[0], rest[1]]) as usize, &rest[2..])
            }
            OP_PUSHDATA4 => {
                if rest.len() < 4 {
                    return None;
                }
                (u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize, &rest[4..])
            }
            _ => return None,
        };
        if rest.len() < len {
            return None;
        }
        pushes.push(&rest[..len]);
        body = &rest[len..];
    }
    Some(pushes)
}
