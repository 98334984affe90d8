use bitcoin::{
    absolute::LockTime,
    hashes::{hash160, Hash},
    secp256k1::{Message, PublicKey, Secp256k1, SecretKey},
    transaction::Version,
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness,
};
use criterion::{criterion_group, criterion_main, Criterion};
use txscript::{
    evaluate, generate_signature_hash, parse_script, save_script, Opcode, Operation, Script,
    SIGHASH_ALL,
};

struct BenchCase {
    name: &'static str,
    input_script: Vec<u8>,
    output_script: Vec<u8>,
    tx: Transaction,
    bip16: bool,
}

fn spending_transaction() -> Transaction {
    Transaction {
        version: Version(1),
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::default(),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(50_000),
            script_pubkey: ScriptBuf::new(),
        }],
    }
}

fn sign_input(secret: &SecretKey, tx: &Transaction, script_code: &[u8]) -> Vec<u8> {
    let secp = Secp256k1::new();
    let script_code = parse_script(script_code).expect("script code parses");
    let digest = generate_signature_hash(tx, 0, &script_code, SIGHASH_ALL);
    let mut signature = secp
        .sign_ecdsa(&Message::from_digest(digest), secret)
        .serialize_der()
        .to_vec();
    signature.push(SIGHASH_ALL as u8);
    signature
}

fn push_script(items: &[&[u8]]) -> Vec<u8> {
    let mut script = Script::new();
    for item in items {
        script.push_operation(Operation::push(item.to_vec()));
    }
    save_script(&script)
}

fn arithmetic_case() -> BenchCase {
    let mut locking = Script::new();
    locking.push_operation(Operation::new(Opcode::Op1));
    locking.push_operation(Operation::new(Opcode::Op2));
    locking.push_operation(Operation::new(Opcode::Add));
    locking.push_operation(Operation::new(Opcode::Op3));
    locking.push_operation(Operation::new(Opcode::Equal));
    BenchCase {
        name: "arithmetic",
        input_script: Vec::new(),
        output_script: save_script(&locking),
        tx: spending_transaction(),
        bip16: false,
    }
}

fn p2pkh_case() -> BenchCase {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&[11; 32]).expect("valid key");
    let pubkey = PublicKey::from_secret_key(&secp, &secret).serialize();
    let tx = spending_transaction();

    let mut locking = Script::new();
    locking.push_operation(Operation::new(Opcode::Dup));
    locking.push_operation(Operation::new(Opcode::Hash160));
    locking.push_operation(Operation::push(
        hash160::Hash::hash(&pubkey).to_byte_array().to_vec(),
    ));
    locking.push_operation(Operation::new(Opcode::Equalverify));
    locking.push_operation(Operation::new(Opcode::Checksig));
    let locking = save_script(&locking);

    let signature = sign_input(&secret, &tx, &locking);
    BenchCase {
        name: "p2pkh",
        input_script: push_script(&[&signature, &pubkey]),
        output_script: locking,
        tx,
        bip16: false,
    }
}

fn p2sh_case() -> BenchCase {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&[12; 32]).expect("valid key");
    let pubkey = PublicKey::from_secret_key(&secp, &secret).serialize();
    let tx = spending_transaction();

    let mut redeem = Script::new();
    redeem.push_operation(Operation::push(pubkey.to_vec()));
    redeem.push_operation(Operation::new(Opcode::Checksig));
    let redeem_bytes = save_script(&redeem);

    let mut locking = Script::new();
    locking.push_operation(Operation::new(Opcode::Hash160));
    locking.push_operation(Operation::push(
        hash160::Hash::hash(&redeem_bytes).to_byte_array().to_vec(),
    ));
    locking.push_operation(Operation::new(Opcode::Equal));

    let signature = sign_input(&secret, &tx, &redeem_bytes);
    BenchCase {
        name: "p2sh",
        input_script: push_script(&[&signature, &redeem_bytes]),
        output_script: save_script(&locking),
        tx,
        bip16: true,
    }
}

fn evaluation_bench(c: &mut Criterion) {
    let cases = vec![arithmetic_case(), p2pkh_case(), p2sh_case()];

    let mut group = c.benchmark_group("evaluate");
    for case in &cases {
        group.bench_function(case.name, |b| {
            b.iter(|| {
                assert!(evaluate(
                    &case.input_script,
                    &case.output_script,
                    &case.tx,
                    0,
                    case.bip16,
                ));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, evaluation_bench);
criterion_main!(benches);
