#[cfg(not(feature = "integration"))]
#[test]
fn integration_tests_disabled() {
    // Enable with: cargo test --features integration
}

#[cfg(feature = "integration")]
mod integration {
    use std::time::Duration;

    use alloy::providers::{Provider, ProviderBuilder};
    use alloy_chains::Chain;
    use block_space::{ChainFetcher, EvmFetcher, FetcherConfig};
    use testcontainers_modules::{anvil::AnvilNode, testcontainers::runners::AsyncRunner};
    use url::Url;

    const ANVIL_PORT: u16 = 8545;
    const RECV_TIMEOUT: Duration = Duration::from_secs(10);

    async fn anvil_rpc_url(
        node: &testcontainers_modules::testcontainers::ContainerAsync<AnvilNode>,
    ) -> Url {
        let port = node.get_host_port_ipv4(ANVIL_PORT).await.unwrap();
        format!("http://localhost:{port}").parse().unwrap()
    }

    #[tokio::test]
    async fn fetcher_receives_genesis_summary() {
        let node = AnvilNode::latest().start().await.unwrap();
        let rpc_url = anvil_rpc_url(&node).await;

        let rx = EvmFetcher::spawn(FetcherConfig {
            chain: Chain::mainnet(),
            rpc_url,
        });

        let block = rx
            .recv_timeout(RECV_TIMEOUT)
            .expect("should receive genesis block");

        assert_eq!(block.number, 0, "first block should be genesis");
        assert_eq!(block.tx_count, 0, "genesis block has no transactions");
        assert!(block.hash.is_some_and(|h| h.starts_with("0x")));
    }

    #[tokio::test]
    async fn fetcher_counts_transactions() {
        let node = AnvilNode::latest().start().await.unwrap();
        let rpc_url = anvil_rpc_url(&node).await;

        let provider = ProviderBuilder::new().connect_http(rpc_url.clone());

        // Anvil pre-funds 10 accounts; send value transfers between them.
        let accounts = provider.get_accounts().await.unwrap();
        assert!(accounts.len() >= 2, "Anvil should have pre-funded accounts");

        for _ in 0..2 {
            let tx = alloy::rpc::types::TransactionRequest::default()
                .from(accounts[0])
                .to(accounts[1])
                .value(alloy::primitives::U256::from(1_000_000_000_000_000u128));
            provider
                .send_transaction(tx)
                .await
                .expect("send_transaction should succeed")
                .watch()
                .await
                .expect("transaction should be mined");
        }

        let rx = EvmFetcher::spawn(FetcherConfig {
            chain: Chain::mainnet(),
            rpc_url,
        });

        let mut total = 0;
        while let Ok(block) = rx.recv_timeout(RECV_TIMEOUT) {
            total += block.tx_count;
            if total >= 2 {
                break;
            }
        }
        assert_eq!(total, 2, "both transfers should be counted");
    }
}
